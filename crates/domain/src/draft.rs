// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Drafts: pre-submission orders saved incrementally.

use crate::error::DomainError;
use crate::order::Order;
use crate::order_status::OrderStatus;
use serde::{Deserialize, Serialize};

/// A not-yet-submitted order, owned by its authoring customer.
///
/// A draft is saved incrementally by the client's debounced autosave.
/// Saves carry a monotonically increasing edit sequence number; a save
/// is applied only when its sequence exceeds the stored one, so a stale
/// payload arriving late can never overwrite a newer save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Canonical numeric identifier assigned by the persistence layer.
    pub draft_id: Option<i64>,
    /// The highest edit sequence number applied so far.
    pub edit_seq: i64,
    /// The draft order content. Always `Draft` status, never numbered.
    pub order: Order,
}

impl Draft {
    /// Creates a new draft at sequence zero.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotADraft` if the supplied order is not in
    /// `Draft` status, or `DomainError::OrderNumberAlreadyAssigned` if it
    /// already carries an order number.
    pub fn new(order: Order) -> Result<Self, DomainError> {
        if order.status != OrderStatus::Draft {
            return Err(DomainError::NotADraft {
                status: order.status.as_str().to_string(),
            });
        }
        if let Some(order_number) = &order.order_number {
            return Err(DomainError::OrderNumberAlreadyAssigned {
                order_number: order_number.clone(),
            });
        }
        Ok(Self {
            draft_id: None,
            edit_seq: 0,
            order,
        })
    }

    /// Returns true if a save at the given sequence would be applied.
    ///
    /// Last-write-wins is decided by the sequence number, not by arrival
    /// order.
    #[must_use]
    pub const fn accepts_edit_seq(&self, edit_seq: i64) -> bool {
        edit_seq > self.edit_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn draft_order() -> Order {
        Order::new_draft(
            1,
            2,
            String::from("2026-CV-000321"),
            String::from("Maricopa County Superior Court"),
            String::from("Subpoena"),
            OffsetDateTime::UNIX_EPOCH,
            None,
            OffsetDateTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_new_draft_starts_at_sequence_zero() {
        let draft = match Draft::new(draft_order()) {
            Ok(draft) => draft,
            Err(e) => panic!("Expected valid draft: {e}"),
        };
        assert_eq!(draft.edit_seq, 0);
        assert_eq!(draft.draft_id, None);
    }

    #[test]
    fn test_non_draft_order_refused() {
        let mut order = draft_order();
        order.status = crate::order_status::OrderStatus::Open;
        assert!(Draft::new(order).is_err());
    }

    #[test]
    fn test_numbered_order_refused() {
        let mut order = draft_order();
        order.order_number = Some(String::from("PS-2026-0A1B2C"));
        assert!(Draft::new(order).is_err());
    }

    #[test]
    fn test_stale_sequence_not_accepted() {
        let mut draft = match Draft::new(draft_order()) {
            Ok(draft) => draft,
            Err(e) => panic!("Expected valid draft: {e}"),
        };
        draft.edit_seq = 5;

        assert!(draft.accepts_edit_seq(6));
        assert!(!draft.accepts_edit_seq(5));
        assert!(!draft.accepts_edit_seq(4));
    }
}
