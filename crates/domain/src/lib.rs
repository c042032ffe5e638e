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

mod bid;
mod draft;
mod error;
mod order;
mod order_status;
mod pricing;
mod recipient;
mod validation;

#[cfg(test)]
mod tests;

pub use bid::{Bid, BidStatus, validate_bid_amount};
pub use draft::Draft;
pub use error::DomainError;
pub use order::{Order, OrderPatch};
pub use order_status::{OrderStatus, derive_order_status};
pub use pricing::{
    CERTIFIED_MAIL_RATE, OrderTotals, PROCESS_SERVICE_RATE, PROCESSING_FEE_RATE, PriceBreakdown,
    PriceChange, REMOTE_LOCATION_RATE, RUSH_SERVICE_RATE, add_on_charges, compute_price,
    order_totals, price_change, round_to_cents, standard_service_charges, totals_for,
};
pub use recipient::{
    Assignment, AssignmentMode, PriceStatus, Recipient, RecipientPatch, RecipientStatus,
    ServiceOptions,
};
pub use validation::{validate_case_number, validate_order_patch};
