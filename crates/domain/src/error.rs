// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A recipient has neither process service nor certified mail selected.
    MissingServiceMethod {
        /// A human-readable reference to the recipient (name or client ref).
        recipient: String,
    },
    /// A guided recipient has no process server selected.
    MissingAssignedServer {
        /// A human-readable reference to the recipient.
        recipient: String,
    },
    /// A server was bound to an automated recipient outside of bid acceptance.
    ServerBoundOutsideBidding {
        /// A human-readable reference to the recipient.
        recipient: String,
    },
    /// A server selection was attempted on a recipient that is not guided.
    ServerSelectionRequiresGuidedMode {
        /// A human-readable reference to the recipient.
        recipient: String,
    },
    /// An order was submitted with no recipients.
    EmptyRecipients,
    /// The case number is empty or invalid.
    InvalidCaseNumber(String),
    /// The recipient name is empty or invalid.
    InvalidRecipientName(String),
    /// A bid amount is zero or negative.
    InvalidBidAmount {
        /// The offending amount.
        amount: Decimal,
    },
    /// A state transition not permitted by the lifecycle rules was requested.
    InvalidStatusTransition {
        /// The state transitioned from.
        from: String,
        /// The state transitioned to.
        to: String,
        /// Why the transition is not permitted.
        reason: String,
    },
    /// A recipient referenced by id does not exist on the order.
    RecipientNotFound {
        /// The recipient id.
        recipient_id: i64,
    },
    /// A recipient patch carried no recipient id.
    RecipientPatchMissingId,
    /// An order number was assigned to an order that already has one.
    OrderNumberAlreadyAssigned {
        /// The existing order number.
        order_number: String,
    },
    /// An operation that requires a draft was given a submitted order.
    NotADraft {
        /// The actual status of the order.
        status: String,
    },
    /// A lifecycle status string could not be parsed.
    InvalidStatus {
        /// The unparseable status string.
        status: String,
    },
    /// An assignment mode string could not be parsed.
    InvalidAssignmentMode {
        /// The unparseable mode string.
        mode: String,
    },
    /// The same process server already has a pending bid on the recipient.
    DuplicatePendingBid {
        /// The process server id.
        process_server_id: i64,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingServiceMethod { recipient } => {
                write!(
                    f,
                    "Recipient '{recipient}' must have at least one of process service or certified mail"
                )
            }
            Self::MissingAssignedServer { recipient } => {
                write!(
                    f,
                    "Guided recipient '{recipient}' has no process server selected"
                )
            }
            Self::ServerBoundOutsideBidding { recipient } => {
                write!(
                    f,
                    "Automated recipient '{recipient}' cannot have a server bound before a bid is accepted"
                )
            }
            Self::ServerSelectionRequiresGuidedMode { recipient } => {
                write!(
                    f,
                    "Recipient '{recipient}' is not in guided mode; server selection is not permitted"
                )
            }
            Self::EmptyRecipients => write!(f, "Order must have at least one recipient"),
            Self::InvalidCaseNumber(msg) => write!(f, "Invalid case number: {msg}"),
            Self::InvalidRecipientName(msg) => write!(f, "Invalid recipient name: {msg}"),
            Self::InvalidBidAmount { amount } => {
                write!(f, "Bid amount must be positive, got {amount}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::RecipientNotFound { recipient_id } => {
                write!(f, "Recipient {recipient_id} not found on order")
            }
            Self::RecipientPatchMissingId => {
                write!(f, "Recipient patch must reference a persisted recipient id")
            }
            Self::OrderNumberAlreadyAssigned { order_number } => {
                write!(f, "Order already has order number '{order_number}'")
            }
            Self::NotADraft { status } => {
                write!(f, "Operation requires a draft order, but status is '{status}'")
            }
            Self::InvalidStatus { status } => write!(f, "Unknown status: '{status}'"),
            Self::InvalidAssignmentMode { mode } => {
                write!(f, "Unknown assignment mode: '{mode}'")
            }
            Self::DuplicatePendingBid { process_server_id } => {
                write!(
                    f,
                    "Process server {process_server_id} already has a pending bid on this recipient"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
