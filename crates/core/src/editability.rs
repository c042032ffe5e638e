// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The editability predicate.
//!
//! This is the single source of truth consulted by every edit surface,
//! and it is re-evaluated at commit time inside `apply`, because the
//! order status may have advanced between form-open and save.

use crate::error::CoreError;
use proserve_domain::{Order, OrderStatus, Recipient, RecipientPatch};

/// Whether an order may currently be edited, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editability {
    /// True if edits are permitted.
    pub allowed: bool,
    /// When locked, a human-readable reason.
    pub lock_reason: Option<String>,
}

impl Editability {
    /// An unlocked result.
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            lock_reason: None,
        }
    }

    /// A locked result with a reason.
    #[must_use]
    pub const fn locked(reason: String) -> Self {
        Self {
            allowed: false,
            lock_reason: Some(reason),
        }
    }
}

/// Evaluates whether an order may be edited.
///
/// Editing is denied outright for orders that are in progress, completed,
/// or cancelled. Every other status permits edits, subject to the
/// per-recipient restrictions of `check_recipient_patch`.
#[must_use]
pub fn can_edit(order: &Order) -> Editability {
    match order.status {
        OrderStatus::InProgress => {
            Editability::locked(String::from("order is in progress; delivery has begun"))
        }
        OrderStatus::Completed => Editability::locked(String::from("order is completed")),
        OrderStatus::Cancelled => Editability::locked(String::from("order is cancelled")),
        OrderStatus::Draft
        | OrderStatus::Open
        | OrderStatus::Bidding
        | OrderStatus::PartiallyAssigned
        | OrderStatus::Assigned
        | OrderStatus::Failed => Editability::allowed(),
    }
}

/// Checks a recipient patch against the recipient's own status.
///
/// Price-affecting fields (service flags, assignment mode, server
/// selection, prices) may only change while the recipient is still open
/// or bidding; once a server is bound the agreed price is settled.
///
/// # Errors
///
/// Returns `CoreError::Conflict` if a price-affecting patch targets a
/// recipient whose status no longer permits it.
pub fn check_recipient_patch(
    recipient: &Recipient,
    patch: &RecipientPatch,
) -> Result<(), CoreError> {
    if patch.is_price_affecting() && !recipient.status.allows_price_edits() {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is {}; price-affecting fields are locked",
                recipient.display_ref(),
                recipient.status
            ),
        });
    }
    Ok(())
}
