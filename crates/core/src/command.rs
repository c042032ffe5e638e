// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use proserve_domain::{Order, OrderPatch};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// The outcome of a delivery attempt, as reported by the external
/// delivery subsystem. The core only consumes the resulting signal; the
/// attempt/exhaustion policy lives outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// An attempt was made; service is not yet complete.
    Attempted,
    /// The recipient was successfully served.
    Delivered,
    /// The attempt policy is exhausted; service failed.
    Exhausted,
}

impl AttemptOutcome {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attempted => "attempted",
            Self::Delivered => "delivered",
            Self::Exhausted => "exhausted",
        }
    }
}

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes. Anything
/// non-deterministic (timestamps, generated order numbers) is supplied
/// by the caller so that applying a command is a pure computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new draft for a customer.
    CreateDraft {
        /// The authoring customer.
        customer_id: i64,
        /// The initial draft content (must be in `Draft` status).
        order: Order,
    },
    /// Apply an autosave payload to a draft.
    SaveDraft {
        /// The draft to save.
        draft_id: i64,
        /// The client's edit sequence number for this payload.
        edit_seq: i64,
        /// The full replacement draft content.
        order: Order,
    },
    /// Delete a draft without submitting it.
    DiscardDraft {
        /// The draft to discard.
        draft_id: i64,
    },
    /// Promote a draft to a submitted order.
    SubmitOrder {
        /// The draft to submit.
        draft_id: i64,
        /// The generated order number to assign at this instant.
        order_number: String,
    },
    /// Apply a partial update to a submitted order.
    UpdateOrder {
        /// The order to update.
        order_id: i64,
        /// The order-level fields and recipient patches to apply.
        patch: OrderPatch,
    },
    /// Confirm the selected server on a guided recipient, binding it.
    ConfirmAssignment {
        /// The order the recipient belongs to.
        order_id: i64,
        /// The guided recipient to confirm.
        recipient_id: i64,
    },
    /// Submit a bid against an automated recipient.
    SubmitBid {
        /// The order the recipient belongs to.
        order_id: i64,
        /// The automated recipient being bid on.
        recipient_id: i64,
        /// The bidding process server.
        process_server_id: i64,
        /// The offered price.
        amount: Decimal,
        /// Optional note to the customer.
        comment: Option<String>,
        /// When the bid was submitted.
        submitted_at: OffsetDateTime,
    },
    /// Accept a pending bid, binding the bidder and price atomically.
    AcceptBid {
        /// The bid to accept.
        bid_id: i64,
    },
    /// Reject a pending bid.
    RejectBid {
        /// The bid to reject.
        bid_id: i64,
    },
    /// Record a delivery attempt outcome on a recipient.
    RecordDeliveryAttempt {
        /// The order the recipient belongs to.
        order_id: i64,
        /// The recipient that was attempted.
        recipient_id: i64,
        /// The reported outcome.
        outcome: AttemptOutcome,
        /// When the attempt was made.
        attempted_at: OffsetDateTime,
    },
    /// Cancel an order. Terminal; no further mutation is permitted.
    CancelOrder {
        /// The order to cancel.
        order_id: i64,
    },
}
