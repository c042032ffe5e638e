// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Assignment, OrderStatus, Recipient, RecipientStatus, ServiceOptions, derive_order_status,
};

fn recipient_in(status: RecipientStatus) -> Recipient {
    let mut recipient: Recipient = Recipient::new(None);
    recipient.recipient_id = Some(1);
    recipient.name = String::from("Recipient");
    recipient.service = ServiceOptions {
        process_service: true,
        certified_mail: false,
        rush_service: false,
        remote_location: false,
    };
    recipient.status = status;
    recipient
}

#[test]
fn test_order_status_string_round_trip() {
    let statuses = vec![
        OrderStatus::Draft,
        OrderStatus::Open,
        OrderStatus::Bidding,
        OrderStatus::PartiallyAssigned,
        OrderStatus::Assigned,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Failed,
        OrderStatus::Cancelled,
    ];

    for status in statuses {
        let s = status.as_str();
        match s.parse::<OrderStatus>() {
            Ok(parsed) => assert_eq!(status, parsed),
            Err(e) => panic!("Failed to parse status string: {s}: {e}"),
        }
    }
}

#[test]
fn test_invalid_status_string() {
    assert!("nonsense".parse::<OrderStatus>().is_err());
}

#[test]
fn test_terminal_states() {
    assert!(OrderStatus::Completed.is_terminal());
    assert!(OrderStatus::Failed.is_terminal());
    assert!(OrderStatus::Cancelled.is_terminal());
    assert!(!OrderStatus::Draft.is_terminal());
    assert!(!OrderStatus::Open.is_terminal());
    assert!(!OrderStatus::InProgress.is_terminal());
}

#[test]
fn test_cancelled_reachable_from_all_non_terminal_states() {
    let non_terminal = vec![
        OrderStatus::Draft,
        OrderStatus::Open,
        OrderStatus::Bidding,
        OrderStatus::PartiallyAssigned,
        OrderStatus::Assigned,
        OrderStatus::InProgress,
    ];

    for status in non_terminal {
        assert!(
            status.can_transition_to(OrderStatus::Cancelled),
            "{status} must allow cancellation"
        );
    }
    assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Failed.can_transition_to(OrderStatus::Cancelled));
}

#[test]
fn test_submission_is_the_only_way_out_of_draft() {
    assert!(OrderStatus::Draft.can_transition_to(OrderStatus::Open));
    assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::Bidding));
    assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::Assigned));
    assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::InProgress));
}

#[test]
fn test_no_transitions_from_terminal_states() {
    let terminal = vec![
        OrderStatus::Completed,
        OrderStatus::Failed,
        OrderStatus::Cancelled,
    ];

    for status in terminal {
        assert!(status.validate_transition(OrderStatus::Open).is_err());
        assert!(status.validate_transition(OrderStatus::InProgress).is_err());
        assert!(status.validate_transition(OrderStatus::Cancelled).is_err());
    }
}

#[test]
fn test_delivery_progression() {
    assert!(OrderStatus::Assigned.can_transition_to(OrderStatus::InProgress));
    assert!(OrderStatus::PartiallyAssigned.can_transition_to(OrderStatus::InProgress));
    assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Completed));
    assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Failed));
    assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Completed));
}

#[test]
fn test_derive_all_open_is_open() {
    let recipients = vec![
        recipient_in(RecipientStatus::Open),
        recipient_in(RecipientStatus::Open),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::Open);
}

#[test]
fn test_derive_any_bidding_is_bidding() {
    let recipients = vec![
        recipient_in(RecipientStatus::Open),
        recipient_in(RecipientStatus::Bidding),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::Bidding);
}

#[test]
fn test_derive_some_assigned_is_partially_assigned() {
    let recipients = vec![
        recipient_in(RecipientStatus::Assigned),
        recipient_in(RecipientStatus::Bidding),
    ];
    assert_eq!(
        derive_order_status(&recipients),
        OrderStatus::PartiallyAssigned
    );
}

#[test]
fn test_derive_all_assigned_is_assigned() {
    let recipients = vec![
        recipient_in(RecipientStatus::Assigned),
        recipient_in(RecipientStatus::Assigned),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::Assigned);
}

#[test]
fn test_derive_any_attempt_is_in_progress() {
    let recipients = vec![
        recipient_in(RecipientStatus::InProgress),
        recipient_in(RecipientStatus::Assigned),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::InProgress);
}

#[test]
fn test_derive_one_completed_one_pending_is_in_progress() {
    let recipients = vec![
        recipient_in(RecipientStatus::Completed),
        recipient_in(RecipientStatus::Assigned),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::InProgress);
}

#[test]
fn test_derive_all_completed_is_completed() {
    let recipients = vec![
        recipient_in(RecipientStatus::Completed),
        recipient_in(RecipientStatus::Completed),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::Completed);
}

#[test]
fn test_derive_all_terminal_with_failure_is_failed() {
    let recipients = vec![
        recipient_in(RecipientStatus::Completed),
        recipient_in(RecipientStatus::Failed),
    ];
    assert_eq!(derive_order_status(&recipients), OrderStatus::Failed);
}

#[test]
fn test_recipient_price_edit_window() {
    assert!(RecipientStatus::Open.allows_price_edits());
    assert!(RecipientStatus::Bidding.allows_price_edits());
    assert!(!RecipientStatus::Assigned.allows_price_edits());
    assert!(!RecipientStatus::InProgress.allows_price_edits());
    assert!(!RecipientStatus::Completed.allows_price_edits());
}

#[test]
fn test_automated_recipient_unbound_while_open_or_bidding() {
    let mut recipient = recipient_in(RecipientStatus::Open);
    recipient.assignment = Assignment::new_automated();
    assert_eq!(recipient.assignment.assigned_server_id(), None);

    recipient.status = RecipientStatus::Bidding;
    assert_eq!(recipient.assignment.assigned_server_id(), None);
}
