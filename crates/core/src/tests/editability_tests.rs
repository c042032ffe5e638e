// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::state_with_open_order;
use crate::{can_edit, check_recipient_patch};
use proserve_domain::{OrderStatus, RecipientPatch, RecipientStatus, ServiceOptions};

#[test]
fn test_editable_statuses() {
    let mut state = state_with_open_order(100);
    let editable = vec![
        OrderStatus::Open,
        OrderStatus::Bidding,
        OrderStatus::PartiallyAssigned,
        OrderStatus::Assigned,
        OrderStatus::Failed,
    ];

    for status in editable {
        state.orders[0].status = status;
        let editability = can_edit(&state.orders[0]);
        assert!(editability.allowed, "{status} must be editable");
        assert_eq!(editability.lock_reason, None);
    }
}

#[test]
fn test_locked_statuses_carry_a_reason() {
    let mut state = state_with_open_order(100);
    let locked = vec![
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    for status in locked {
        state.orders[0].status = status;
        let editability = can_edit(&state.orders[0]);
        assert!(!editability.allowed, "{status} must be locked");
        assert!(editability.lock_reason.is_some());
    }
}

#[test]
fn test_price_affecting_patch_locked_after_assignment() {
    let mut state = state_with_open_order(100);
    state.orders[0].recipients[0].status = RecipientStatus::Assigned;

    let patch = RecipientPatch {
        recipient_id: Some(11),
        service: Some(ServiceOptions {
            process_service: true,
            certified_mail: true,
            rush_service: false,
            remote_location: false,
        }),
        ..RecipientPatch::default()
    };

    assert!(check_recipient_patch(&state.orders[0].recipients[0], &patch).is_err());
}

#[test]
fn test_cosmetic_patch_allowed_after_assignment() {
    let mut state = state_with_open_order(100);
    state.orders[0].recipients[0].status = RecipientStatus::Assigned;

    let patch = RecipientPatch {
        recipient_id: Some(11),
        name: Some(String::from("Jordan Q. Smith")),
        ..RecipientPatch::default()
    };

    assert!(check_recipient_patch(&state.orders[0].recipients[0], &patch).is_ok());
}

#[test]
fn test_price_affecting_patch_allowed_while_bidding() {
    let mut state = state_with_open_order(100);
    state.orders[0].recipients[0].status = RecipientStatus::Bidding;

    let patch = RecipientPatch {
        recipient_id: Some(11),
        service: Some(ServiceOptions {
            process_service: true,
            certified_mail: true,
            rush_service: false,
            remote_location: false,
        }),
        ..RecipientPatch::default()
    };

    assert!(check_recipient_patch(&state.orders[0].recipients[0], &patch).is_ok());
}
