// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cross-cutting field validation rules.

use crate::error::DomainError;
use crate::order::{Order, OrderPatch};

/// Validates that a case number is non-empty.
///
/// # Errors
///
/// Returns `DomainError::InvalidCaseNumber` if the case number is empty
/// or whitespace.
pub fn validate_case_number(case_number: &str) -> Result<(), DomainError> {
    if case_number.trim().is_empty() {
        return Err(DomainError::InvalidCaseNumber(String::from(
            "case number must not be empty",
        )));
    }
    Ok(())
}

/// Validates an order patch as a whole against its target order.
///
/// Each recipient patch must reference a recipient that exists on the
/// order. The patch is all-or-nothing: the first invalid element fails
/// the entire update and nothing may be applied.
///
/// # Errors
///
/// Returns a `DomainError` for the first invalid element.
pub fn validate_order_patch(order: &Order, patch: &OrderPatch) -> Result<(), DomainError> {
    if let Some(case_number) = &patch.case_number {
        validate_case_number(case_number)?;
    }
    for recipient_patch in &patch.recipients {
        let Some(recipient_id) = recipient_patch.recipient_id else {
            return Err(DomainError::RecipientPatchMissingId);
        };
        if order.recipient_by_id(recipient_id).is_none() {
            return Err(DomainError::RecipientNotFound { recipient_id });
        }
    }
    Ok(())
}
