// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod auth;
mod collaborators;
mod deadline_policy;
mod error;
mod handlers;
mod order_number;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role};
pub use collaborators::{
    CityInfo, CollaboratorError, DocumentStore, GeographyService, StateInfo, StoredDocument,
};
pub use deadline_policy::{DeadlinePolicy, DeadlinePolicyError};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    accept_bid, cancel_order, cities_by_state, confirm_assignment, create_draft, discard_draft,
    get_order, get_order_editability, list_bids, list_orders, price_preview,
    record_delivery_attempt, reject_bid, states_list, submit_bid, submit_order, update_draft,
    update_order, upload_document,
};
pub use order_number::{MAX_ATTEMPTS, generate_order_number};
pub use request_response::{
    AcceptBidResponse, BidInfo, CancelOrderRequest, CancelOrderResponse,
    ConfirmAssignmentRequest, ConfirmAssignmentResponse, CreateDraftRequest, CreateDraftResponse,
    DiscardDraftResponse, ListBidsRequest, ListBidsResponse, ListOrdersRequest,
    ListOrdersResponse, OrderEditabilityResponse, OrderInfo, OrderTotalsInfo,
    PriceBreakdownInfo, PriceChangeInfo, PricePreviewRequest, PricePreviewResponse,
    RecipientInfo, RecipientInput, RecipientPatchInput, RecipientPriceInfo,
    RecordDeliveryAttemptRequest, RecordDeliveryAttemptResponse, RejectBidResponse,
    SubmitBidRequest, SubmitBidResponse, SubmitOrderRequest, SubmitOrderResponse,
    UpdateDraftRequest, UpdateDraftResponse, UpdateOrderRequest, UpdateOrderResponse,
};
