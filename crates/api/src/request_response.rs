// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! These DTOs are distinct from domain types and represent the API
//! contract: primitive field shapes in, display-ready shapes out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use proserve_domain::PriceChange;

/// A recipient as supplied by the client when drafting an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientInput {
    /// Client-held correlation id for recipients without a persisted id.
    pub client_ref: Option<String>,
    /// The person or entity to be served.
    pub name: String,
    /// Street address.
    pub street_address: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state_code: String,
    /// ZIP code.
    pub zip_code: String,
    /// Personal process service flag.
    pub process_service: bool,
    /// Certified mail flag.
    pub certified_mail: bool,
    /// Rush surcharge flag.
    pub rush_service: bool,
    /// Remote location surcharge flag.
    pub remote_location: bool,
    /// Assignment mode ("automated" or "guided").
    pub assignment_mode: String,
    /// The selected server (guided mode only).
    pub assigned_server_id: Option<i64>,
    /// A server-quoted price (guided mode only).
    pub quoted_price: Option<Decimal>,
    /// A negotiated price (guided mode only).
    pub negotiated_price: Option<Decimal>,
}

/// API request to create a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// The court case number.
    pub case_number: String,
    /// The jurisdiction the documents were issued in.
    pub jurisdiction: String,
    /// The type of document being served.
    pub document_type: String,
    /// The service deadline.
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    /// Free-form instructions for the process server.
    pub special_instructions: Option<String>,
    /// The initial recipients.
    pub recipients: Vec<RecipientInput>,
}

/// API response for a successful draft creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDraftResponse {
    /// The canonical draft identifier.
    pub draft_id: i64,
    /// The draft's edit sequence (zero at creation).
    pub edit_seq: i64,
    /// A success message.
    pub message: String,
}

/// API request to autosave a draft.
///
/// Carries the full replacement payload plus the client's edit sequence
/// number; saves are applied in sequence order, not arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDraftRequest {
    /// The draft to save.
    pub draft_id: i64,
    /// The client's edit sequence number for this payload.
    pub edit_seq: i64,
    /// The court case number.
    pub case_number: String,
    /// The jurisdiction the documents were issued in.
    pub jurisdiction: String,
    /// The type of document being served.
    pub document_type: String,
    /// The service deadline.
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    /// Free-form instructions for the process server.
    pub special_instructions: Option<String>,
    /// The full recipient list.
    pub recipients: Vec<RecipientInput>,
}

/// API response for a draft save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDraftResponse {
    /// The draft identifier.
    pub draft_id: i64,
    /// The stored edit sequence after this save.
    pub edit_seq: i64,
    /// False when the payload was stale and left the stored draft
    /// untouched.
    pub applied: bool,
    /// A success message.
    pub message: String,
}

/// API response for a draft discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardDraftResponse {
    /// The discarded draft's identifier.
    pub draft_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to submit a draft as an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    /// The draft to submit.
    pub draft_id: i64,
}

/// Order-level payment totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotalsInfo {
    /// Sum of every recipient's due-now amount.
    pub subtotal: Decimal,
    /// The 3% processing fee on the subtotal.
    pub processing_fee: Decimal,
    /// Subtotal plus processing fee.
    pub total: Decimal,
    /// True while any recipient's base amount awaits a bid acceptance.
    pub has_pending_base: bool,
}

/// The price computation for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdownInfo {
    /// The base delivery charge, when resolved.
    pub base: Option<Decimal>,
    /// Rush and remote-location surcharges.
    pub add_ons: Decimal,
    /// The amount currently due.
    pub due_now: Decimal,
    /// True while the base amount is pending a bid acceptance.
    pub pending_base: bool,
}

/// A recipient as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientInfo {
    /// The canonical recipient identifier.
    pub recipient_id: i64,
    /// The client correlation id carried from drafting, if any.
    pub client_ref: Option<String>,
    /// The person or entity to be served.
    pub name: String,
    /// Street address.
    pub street_address: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state_code: String,
    /// ZIP code.
    pub zip_code: String,
    /// Personal process service flag.
    pub process_service: bool,
    /// Certified mail flag.
    pub certified_mail: bool,
    /// Rush surcharge flag.
    pub rush_service: bool,
    /// Remote location surcharge flag.
    pub remote_location: bool,
    /// Assignment mode ("automated" or "guided").
    pub assignment_mode: String,
    /// The bound or selected server, if any.
    pub assigned_server_id: Option<i64>,
    /// Pricing agreement state.
    pub price_status: String,
    /// The final agreed charge, once resolved.
    pub final_agreed_price: Option<Decimal>,
    /// Lifecycle status.
    pub status: String,
    /// The current price computation.
    pub price: PriceBreakdownInfo,
}

/// An order as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// The canonical order identifier.
    pub order_id: i64,
    /// The human-readable order number.
    pub order_number: String,
    /// The ordering customer.
    pub customer_id: i64,
    /// The court case number.
    pub case_number: String,
    /// The jurisdiction the documents were issued in.
    pub jurisdiction: String,
    /// The type of document being served.
    pub document_type: String,
    /// The service deadline.
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    /// Free-form instructions for the process server.
    pub special_instructions: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// The recipients, in display order.
    pub recipients: Vec<RecipientInfo>,
    /// When the order was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When every recipient reached successful completion.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// The recomputed payment totals.
    pub totals: OrderTotalsInfo,
}

/// API response for a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
    /// The canonical order identifier.
    pub order_id: i64,
    /// The newly assigned order number.
    pub order_number: String,
    /// The order's status after submission.
    pub status: String,
    /// The payment totals at submission.
    pub totals: OrderTotalsInfo,
    /// A success message.
    pub message: String,
}

/// API response for an editability query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEditabilityResponse {
    /// The order queried.
    pub order_id: i64,
    /// True if edits are currently permitted.
    pub can_edit: bool,
    /// When locked, a human-readable reason.
    pub lock_reason: Option<String>,
}

/// A partial update to one recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPatchInput {
    /// The recipient to patch.
    pub recipient_id: i64,
    /// New name.
    pub name: Option<String>,
    /// New street address.
    pub street_address: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New state code.
    pub state_code: Option<String>,
    /// New ZIP code.
    pub zip_code: Option<String>,
    /// Replacement process service flag (all four flags travel
    /// together).
    pub process_service: Option<bool>,
    /// Replacement certified mail flag.
    pub certified_mail: Option<bool>,
    /// Replacement rush flag.
    pub rush_service: Option<bool>,
    /// Replacement remote location flag.
    pub remote_location: Option<bool>,
    /// Assignment mode switch ("automated" or "guided").
    pub assignment_mode: Option<String>,
    /// Server selection (guided mode only).
    pub assigned_server_id: Option<i64>,
    /// Quoted price (guided mode only).
    pub quoted_price: Option<Decimal>,
    /// Negotiated price (guided mode only).
    pub negotiated_price: Option<Decimal>,
}

/// API request to update a submitted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    /// The order to update.
    pub order_id: i64,
    /// New case number.
    pub case_number: Option<String>,
    /// New jurisdiction.
    pub jurisdiction: Option<String>,
    /// New document type.
    pub document_type: Option<String>,
    /// New deadline.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    /// New special instructions.
    pub special_instructions: Option<String>,
    /// Per-recipient patches.
    pub recipients: Vec<RecipientPatchInput>,
}

/// What an update changed about one recipient's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChangeInfo {
    /// The patched recipient.
    pub recipient_id: i64,
    /// The change, as the user should see it: a fee delta for pending
    /// automated recipients, full totals otherwise.
    pub change: PriceChange,
}

/// API response for a successful order update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderResponse {
    /// The updated order.
    pub order: OrderInfo,
    /// Price changes for each patched recipient.
    pub price_changes: Vec<PriceChangeInfo>,
    /// A success message.
    pub message: String,
}

/// API request to list orders. Filter and sort are explicit caller
/// parameters; the API holds no session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOrdersRequest {
    /// Optional status filter (e.g. "open", "bidding").
    pub status: Option<String>,
    /// Optional sort ("created_desc", "created_asc", "deadline_asc",
    /// "deadline_desc"). Defaults to newest first.
    pub sort: Option<String>,
}

/// API response for an order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOrdersResponse {
    /// The matching orders.
    pub orders: Vec<OrderInfo>,
}

/// API request for a live price preview of draft recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePreviewRequest {
    /// The recipients to price.
    pub recipients: Vec<RecipientInput>,
}

/// The preview price of one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPriceInfo {
    /// The client correlation id, echoed back.
    pub client_ref: Option<String>,
    /// The price computation.
    pub price: PriceBreakdownInfo,
}

/// API response for a price preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePreviewResponse {
    /// Per-recipient price computations.
    pub recipients: Vec<RecipientPriceInfo>,
    /// The combined totals.
    pub totals: OrderTotalsInfo,
}

/// API request to submit a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBidRequest {
    /// The order the recipient belongs to.
    pub order_id: i64,
    /// The automated recipient being bid on.
    pub recipient_id: i64,
    /// The offered price.
    pub amount: Decimal,
    /// Optional note to the customer.
    pub comment: Option<String>,
}

/// API response for a successful bid submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBidResponse {
    /// The canonical bid identifier.
    pub bid_id: i64,
    /// The order bid on.
    pub order_id: i64,
    /// The recipient bid on.
    pub recipient_id: i64,
    /// The bid's status.
    pub status: String,
    /// A success message.
    pub message: String,
}

/// A bid as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidInfo {
    /// The canonical bid identifier.
    pub bid_id: i64,
    /// The order the target recipient belongs to.
    pub order_id: i64,
    /// The recipient the bid targets.
    pub recipient_id: i64,
    /// The bidding process server.
    pub process_server_id: i64,
    /// The offered price.
    pub amount: Decimal,
    /// Optional note from the server.
    pub comment: Option<String>,
    /// The bid's status.
    pub status: String,
    /// When the bid was submitted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// API request to list the bids on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBidsRequest {
    /// The order whose bids to list.
    pub order_id: i64,
}

/// API response for a bid listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBidsResponse {
    /// The bids, in submission order.
    pub bids: Vec<BidInfo>,
}

/// API response for a successful bid acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptBidResponse {
    /// The order after the acceptance.
    pub order: OrderInfo,
    /// The recipient now bound to the winning server.
    pub recipient: RecipientInfo,
    /// The other pending bids rejected by this acceptance.
    pub rejected_bid_ids: Vec<i64>,
    /// A success message.
    pub message: String,
}

/// API response for a bid rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectBidResponse {
    /// The rejected bid.
    pub bid_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to confirm a guided assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmAssignmentRequest {
    /// The order the recipient belongs to.
    pub order_id: i64,
    /// The guided recipient to confirm.
    pub recipient_id: i64,
}

/// API response for a confirmed assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmAssignmentResponse {
    /// The order after the confirmation.
    pub order: OrderInfo,
    /// The recipient now bound to its selected server.
    pub recipient: RecipientInfo,
    /// A success message.
    pub message: String,
}

/// API request to record a delivery attempt outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDeliveryAttemptRequest {
    /// The order the recipient belongs to.
    pub order_id: i64,
    /// The recipient attempted.
    pub recipient_id: i64,
    /// The outcome ("attempted", "delivered", or "exhausted").
    pub outcome: String,
}

/// API response after recording a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDeliveryAttemptResponse {
    /// The order after the attempt.
    pub order: OrderInfo,
    /// A success message.
    pub message: String,
}

/// API request to cancel an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    /// The order to cancel.
    pub order_id: i64,
}

/// API response for a cancelled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    /// The cancelled order.
    pub order_id: i64,
    /// The order's status after cancellation.
    pub status: String,
    /// A success message.
    pub message: String,
}
