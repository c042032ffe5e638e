// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The order aggregate: order-level fields plus the recipient collection.

use crate::error::DomainError;
use crate::order_status::OrderStatus;
use crate::recipient::Recipient;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A process-service order.
///
/// An order in `Draft` status has no order number and is mutable in full;
/// once promoted past `Draft` it is immutable except through the explicit
/// update operation. Payment totals are never cached on the order; they
/// are recomputed from the recipients on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Canonical numeric identifier assigned by the persistence layer.
    /// `None` until the order is persisted.
    pub order_id: Option<i64>,
    /// Human-readable order number, generated at submission. `None`
    /// exactly while the order is a draft.
    pub order_number: Option<String>,
    /// The tenant this order belongs to.
    pub tenant_id: i64,
    /// The customer who placed the order.
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
    pub status: OrderStatus,
    /// The recipients, in insertion order (meaningful for display only).
    pub recipients: Vec<Recipient>,
    /// When the order (or its originating draft) was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When every recipient reached successful completion.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl Order {
    /// Creates a new draft-status order with no recipients.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new_draft(
        tenant_id: i64,
        customer_id: i64,
        case_number: String,
        jurisdiction: String,
        document_type: String,
        deadline: OffsetDateTime,
        special_instructions: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            order_id: None,
            order_number: None,
            tenant_id,
            customer_id,
            case_number,
            jurisdiction,
            document_type,
            deadline,
            special_instructions,
            status: OrderStatus::Draft,
            recipients: Vec::new(),
            created_at,
            completed_at: None,
        }
    }

    /// Looks up a recipient by its persisted id.
    #[must_use]
    pub fn recipient_by_id(&self, recipient_id: i64) -> Option<&Recipient> {
        self.recipients
            .iter()
            .find(|r| r.recipient_id == Some(recipient_id))
    }

    /// Looks up the index of a recipient by its persisted id.
    #[must_use]
    pub fn recipient_index(&self, recipient_id: i64) -> Option<usize> {
        self.recipients
            .iter()
            .position(|r| r.recipient_id == Some(recipient_id))
    }

    /// Validates everything required for submission: a non-empty case
    /// number, at least one recipient, and every recipient's submission
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a `DomainError`.
    pub fn validate_for_submission(&self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::NotADraft {
                status: self.status.as_str().to_string(),
            });
        }
        if let Some(order_number) = &self.order_number {
            return Err(DomainError::OrderNumberAlreadyAssigned {
                order_number: order_number.clone(),
            });
        }
        crate::validation::validate_case_number(&self.case_number)?;
        if self.recipients.is_empty() {
            return Err(DomainError::EmptyRecipients);
        }
        for recipient in &self.recipients {
            recipient.validate_for_submission()?;
        }
        Ok(())
    }
}

/// A partial update to order-level fields plus a list of recipient
/// patches.
///
/// The whole patch is validated together: if any recipient patch is
/// invalid, nothing is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
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
    /// Per-recipient patches, each targeting a persisted recipient.
    pub recipients: Vec<crate::recipient::RecipientPatch>,
}

impl OrderPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.case_number.is_none()
            && self.jurisdiction.is_none()
            && self.document_type.is_none()
            && self.deadline.is_none()
            && self.special_instructions.is_none()
            && self.recipients.is_empty()
    }
}
