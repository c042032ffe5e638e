// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AssignmentMode, DomainError, Order, OrderPatch, OrderStatus, Recipient, RecipientPatch,
    ServiceOptions, validate_case_number, validate_order_patch,
};
use time::OffsetDateTime;

fn recipient(id: i64) -> Recipient {
    let mut recipient: Recipient = Recipient::new(None);
    recipient.recipient_id = Some(id);
    recipient.name = format!("Recipient {id}");
    recipient.street_address = String::from("100 Main St");
    recipient.city = String::from("Phoenix");
    recipient.state_code = String::from("AZ");
    recipient.zip_code = String::from("85001");
    recipient.service = ServiceOptions {
        process_service: true,
        certified_mail: false,
        rush_service: false,
        remote_location: false,
    };
    recipient
}

fn draft_order() -> Order {
    let mut order = Order::new_draft(
        1,
        2,
        String::from("2026-CV-000123"),
        String::from("King County Superior Court"),
        String::from("Summons"),
        OffsetDateTime::UNIX_EPOCH,
        None,
        OffsetDateTime::UNIX_EPOCH,
    );
    order.recipients = vec![recipient(11), recipient(12)];
    order
}

#[test]
fn test_empty_case_number_rejected() {
    assert!(validate_case_number("").is_err());
    assert!(validate_case_number("   ").is_err());
    assert!(validate_case_number("2026-CV-000123").is_ok());
}

#[test]
fn test_submission_requires_recipients() {
    let mut order = draft_order();
    order.recipients.clear();

    match order.validate_for_submission() {
        Err(DomainError::EmptyRecipients) => {}
        other => panic!("Expected EmptyRecipients, got {other:?}"),
    }
}

#[test]
fn test_submission_validates_every_recipient() {
    let mut order = draft_order();
    order.recipients[1].service.process_service = false;

    match order.validate_for_submission() {
        Err(DomainError::MissingServiceMethod { .. }) => {}
        other => panic!("Expected MissingServiceMethod, got {other:?}"),
    }
}

#[test]
fn test_submission_requires_draft_status() {
    let mut order = draft_order();
    order.status = OrderStatus::Open;

    match order.validate_for_submission() {
        Err(DomainError::NotADraft { .. }) => {}
        other => panic!("Expected NotADraft, got {other:?}"),
    }
}

#[test]
fn test_valid_draft_passes_submission_validation() {
    let order = draft_order();
    assert!(order.validate_for_submission().is_ok());
}

#[test]
fn test_order_patch_rejects_unknown_recipient() {
    let order = draft_order();
    let patch = OrderPatch {
        recipients: vec![RecipientPatch {
            recipient_id: Some(999),
            city: Some(String::from("Tucson")),
            ..RecipientPatch::default()
        }],
        ..OrderPatch::default()
    };

    match validate_order_patch(&order, &patch) {
        Err(DomainError::RecipientNotFound { recipient_id: 999 }) => {}
        other => panic!("Expected RecipientNotFound, got {other:?}"),
    }
}

#[test]
fn test_order_patch_rejects_missing_recipient_id() {
    let order = draft_order();
    let patch = OrderPatch {
        recipients: vec![RecipientPatch {
            recipient_id: None,
            assignment_mode: Some(AssignmentMode::Guided),
            ..RecipientPatch::default()
        }],
        ..OrderPatch::default()
    };

    match validate_order_patch(&order, &patch) {
        Err(DomainError::RecipientPatchMissingId) => {}
        other => panic!("Expected RecipientPatchMissingId, got {other:?}"),
    }
}

#[test]
fn test_order_patch_accepts_known_recipients() {
    let order = draft_order();
    let patch = OrderPatch {
        case_number: Some(String::from("2026-CV-000124")),
        recipients: vec![RecipientPatch {
            recipient_id: Some(11),
            city: Some(String::from("Tucson")),
            ..RecipientPatch::default()
        }],
        ..OrderPatch::default()
    };

    assert!(validate_order_patch(&order, &patch).is_ok());
}
