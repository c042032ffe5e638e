// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    TENANT_ID, create_draft, draft_order, persistence, run, submit_order,
};
use crate::PersistenceError;
use proserve::Command;
use proserve_domain::{BidStatus, OrderStatus, RecipientStatus};
use rust_decimal_macros::dec;
use time::OffsetDateTime;

#[test]
fn test_created_draft_round_trips() {
    let mut persistence = persistence();
    let draft_id = create_draft(&mut persistence);

    let state = match persistence.load_state(TENANT_ID) {
        Ok(state) => state,
        Err(e) => panic!("load_state must succeed: {e}"),
    };
    assert_eq!(state.drafts.len(), 1);

    let draft = &state.drafts[0];
    assert_eq!(draft.draft_id, Some(draft_id));
    assert_eq!(draft.edit_seq, 0);
    assert_eq!(draft.order, {
        let mut expected = draft_order();
        expected.tenant_id = TENANT_ID;
        expected
    });
}

#[test]
fn test_submitted_order_round_trips_every_recipient_field() {
    let mut persistence = persistence();
    let order_id = submit_order(&mut persistence, "PS-2026-0A1B2C");

    let order = match persistence.order_by_id(order_id) {
        Ok(order) => order,
        Err(e) => panic!("order_by_id must succeed: {e}"),
    };

    assert_eq!(order.order_number.as_deref(), Some("PS-2026-0A1B2C"));
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.case_number, "2026-CV-000123");
    assert_eq!(
        order.special_instructions.as_deref(),
        Some("Leave at front desk if refused")
    );

    let drafted = draft_order();
    assert_eq!(order.recipients.len(), drafted.recipients.len());
    for (stored, expected) in order.recipients.iter().zip(drafted.recipients.iter()) {
        assert!(stored.recipient_id.is_some());
        assert_eq!(stored.client_ref, expected.client_ref);
        assert_eq!(stored.name, expected.name);
        assert_eq!(stored.street_address, expected.street_address);
        assert_eq!(stored.city, expected.city);
        assert_eq!(stored.state_code, expected.state_code);
        assert_eq!(stored.zip_code, expected.zip_code);
        assert_eq!(stored.service, expected.service);
        assert_eq!(stored.assignment, expected.assignment);
        assert_eq!(stored.status, RecipientStatus::Open);
    }

    // The draft is consumed by submission.
    let state = match persistence.load_state(TENANT_ID) {
        Ok(state) => state,
        Err(e) => panic!("load_state must succeed: {e}"),
    };
    assert!(state.drafts.is_empty());
}

#[test]
fn test_bid_lifecycle_round_trips() {
    let mut persistence = persistence();
    let order_id = submit_order(&mut persistence, "PS-2026-0A1B2C");

    let order = match persistence.order_by_id(order_id) {
        Ok(order) => order,
        Err(e) => panic!("order_by_id must succeed: {e}"),
    };
    let automated_id = match order.recipients[0].recipient_id {
        Some(id) => id,
        None => panic!("recipient must have an id after submission"),
    };

    let receipt = run(
        &mut persistence,
        Command::SubmitBid {
            order_id,
            recipient_id: automated_id,
            process_server_id: 31,
            amount: dec!(80.00),
            comment: Some(String::from("Same-day available")),
            submitted_at: OffsetDateTime::UNIX_EPOCH,
        },
    );
    let first_bid = match receipt.bid_id {
        Some(id) => id,
        None => panic!("SubmitBid must assign a bid id"),
    };
    let receipt = run(
        &mut persistence,
        Command::SubmitBid {
            order_id,
            recipient_id: automated_id,
            process_server_id: 32,
            amount: dec!(70.00),
            comment: None,
            submitted_at: OffsetDateTime::UNIX_EPOCH,
        },
    );
    let second_bid = match receipt.bid_id {
        Some(id) => id,
        None => panic!("SubmitBid must assign a bid id"),
    };

    run(&mut persistence, Command::AcceptBid { bid_id: first_bid });

    let state = match persistence.load_state(TENANT_ID) {
        Ok(state) => state,
        Err(e) => panic!("load_state must succeed: {e}"),
    };
    assert_eq!(
        state.bid_by_id(first_bid).map(|b| b.status),
        Some(BidStatus::Accepted)
    );
    assert_eq!(
        state.bid_by_id(second_bid).map(|b| b.status),
        Some(BidStatus::Rejected)
    );

    let order = &state.orders[0];
    let recipient = &order.recipients[0];
    assert_eq!(recipient.status, RecipientStatus::Assigned);
    assert_eq!(recipient.assignment.assigned_server_id(), Some(31));
    // Accepted amount plus the rush surcharge.
    assert_eq!(recipient.final_agreed_price, Some(dec!(130.00)));
    assert_eq!(order.status, OrderStatus::PartiallyAssigned);
}

#[test]
fn test_order_number_uniqueness_enforced() {
    let mut persistence = persistence();
    submit_order(&mut persistence, "PS-2026-0A1B2C");

    assert_eq!(
        persistence.order_number_exists("PS-2026-0A1B2C"),
        Ok(true)
    );
    assert_eq!(
        persistence.order_number_exists("PS-2026-FFFFFF"),
        Ok(false)
    );
}

#[test]
fn test_audit_timeline_records_every_transition() {
    let mut persistence = persistence();
    submit_order(&mut persistence, "PS-2026-0A1B2C");

    let events = match persistence.audit_timeline(TENANT_ID, 10) {
        Ok(events) => events,
        Err(e) => panic!("audit_timeline must succeed: {e}"),
    };

    // CreateDraft followed by SubmitOrder, newest first.
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action.name, "SubmitOrder");
    assert_eq!(events[1].action.name, "CreateDraft");
    assert_eq!(events[0].subject, "PS-2026-0A1B2C");
    assert_eq!(events[0].tenant_id, TENANT_ID);
}

#[test]
fn test_unknown_ids_not_found() {
    let persistence = persistence();

    assert_eq!(
        persistence.draft_by_id(999),
        Err(PersistenceError::NotFound(String::from("draft 999")))
    );
    match persistence.order_by_id(999) {
        Err(PersistenceError::NotFound(_)) => {}
        other => panic!("Expected NotFound, got {other:?}"),
    }
}
