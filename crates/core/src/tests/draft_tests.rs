// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    CUSTOMER_ID, TENANT_ID, draft_order, state_with_draft, test_actor, test_cause,
};
use crate::{Command, CoreError, State, TransitionResult, apply};
use proserve_domain::{DomainError, OrderStatus};

fn run(state: &State, command: Command) -> Result<TransitionResult, CoreError> {
    apply(state, command, test_actor(), test_cause())
}

#[test]
fn test_create_draft_appends_unpersisted_draft() {
    let state: State = State::new(TENANT_ID);
    let result = run(
        &state,
        Command::CreateDraft {
            customer_id: CUSTOMER_ID,
            order: draft_order(),
        },
    );

    let transition = match result {
        Ok(transition) => transition,
        Err(e) => panic!("CreateDraft should succeed: {e}"),
    };
    assert_eq!(transition.new_state.drafts.len(), 1);
    assert_eq!(transition.new_state.drafts[0].draft_id, None);
    assert_eq!(transition.new_state.drafts[0].edit_seq, 0);
    assert_eq!(transition.audit_event.action.name, "CreateDraft");
}

#[test]
fn test_create_draft_forces_identity_from_context() {
    let state: State = State::new(TENANT_ID);
    let mut order = draft_order();
    order.tenant_id = 999;
    order.customer_id = 999;

    let result = run(
        &state,
        Command::CreateDraft {
            customer_id: CUSTOMER_ID,
            order,
        },
    );

    let transition = match result {
        Ok(transition) => transition,
        Err(e) => panic!("CreateDraft should succeed: {e}"),
    };
    let draft = &transition.new_state.drafts[0];
    assert_eq!(draft.order.tenant_id, TENANT_ID);
    assert_eq!(draft.order.customer_id, CUSTOMER_ID);
}

#[test]
fn test_save_draft_applies_newer_sequence() {
    let state: State = state_with_draft(10);
    let mut payload = draft_order();
    payload.case_number = String::from("2026-CV-000999");

    let result = run(
        &state,
        Command::SaveDraft {
            draft_id: 10,
            edit_seq: 1,
            order: payload,
        },
    );

    let transition = match result {
        Ok(transition) => transition,
        Err(e) => panic!("SaveDraft should succeed: {e}"),
    };
    let draft = &transition.new_state.drafts[0];
    assert_eq!(draft.edit_seq, 1);
    assert_eq!(draft.order.case_number, "2026-CV-000999");
    assert_eq!(draft.order.status, OrderStatus::Draft);
}

#[test]
fn test_save_draft_ignores_stale_sequence() {
    let state: State = state_with_draft(10);
    let mut newer = draft_order();
    newer.case_number = String::from("2026-CV-000555");
    let newer_state = match run(
        &state,
        Command::SaveDraft {
            draft_id: 10,
            edit_seq: 3,
            order: newer,
        },
    ) {
        Ok(transition) => transition.new_state,
        Err(e) => panic!("SaveDraft should succeed: {e}"),
    };

    // A stale payload arriving late must not overwrite the newer save.
    let mut stale = draft_order();
    stale.case_number = String::from("2026-CV-000111");
    let result = run(
        &newer_state,
        Command::SaveDraft {
            draft_id: 10,
            edit_seq: 2,
            order: stale,
        },
    );

    let transition = match result {
        Ok(transition) => transition,
        Err(e) => panic!("Stale save must be acknowledged, not fail: {e}"),
    };
    let draft = &transition.new_state.drafts[0];
    assert_eq!(draft.edit_seq, 3);
    assert_eq!(draft.order.case_number, "2026-CV-000555");
}

#[test]
fn test_save_draft_same_payload_twice_is_idempotent() {
    let state: State = state_with_draft(10);
    let mut payload = draft_order();
    payload.case_number = String::from("2026-CV-000777");

    let first = match run(
        &state,
        Command::SaveDraft {
            draft_id: 10,
            edit_seq: 1,
            order: payload.clone(),
        },
    ) {
        Ok(transition) => transition.new_state,
        Err(e) => panic!("SaveDraft should succeed: {e}"),
    };
    let second = match run(
        &first,
        Command::SaveDraft {
            draft_id: 10,
            edit_seq: 1,
            order: payload,
        },
    ) {
        Ok(transition) => transition.new_state,
        Err(e) => panic!("Duplicate save must be acknowledged: {e}"),
    };

    assert_eq!(first, second);
}

#[test]
fn test_save_draft_preserves_draft_identity() {
    let state: State = state_with_draft(10);
    let mut payload = draft_order();
    payload.tenant_id = 999;
    payload.customer_id = 999;

    let transition = match run(
        &state,
        Command::SaveDraft {
            draft_id: 10,
            edit_seq: 1,
            order: payload,
        },
    ) {
        Ok(transition) => transition,
        Err(e) => panic!("SaveDraft should succeed: {e}"),
    };
    let draft = &transition.new_state.drafts[0];
    assert_eq!(draft.order.tenant_id, TENANT_ID);
    assert_eq!(draft.order.customer_id, CUSTOMER_ID);
}

#[test]
fn test_save_unknown_draft_not_found() {
    let state: State = State::new(TENANT_ID);
    let result = run(
        &state,
        Command::SaveDraft {
            draft_id: 99,
            edit_seq: 1,
            order: draft_order(),
        },
    );

    match result {
        Err(CoreError::NotFound { .. }) => {}
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_discard_draft_removes_it() {
    let state: State = state_with_draft(10);
    let transition = match run(&state, Command::DiscardDraft { draft_id: 10 }) {
        Ok(transition) => transition,
        Err(e) => panic!("DiscardDraft should succeed: {e}"),
    };
    assert!(transition.new_state.drafts.is_empty());
}

#[test]
fn test_submit_order_promotes_and_deletes_draft() {
    let state: State = state_with_draft(10);
    let transition = match run(
        &state,
        Command::SubmitOrder {
            draft_id: 10,
            order_number: String::from("PS-2026-0A1B2C"),
        },
    ) {
        Ok(transition) => transition,
        Err(e) => panic!("SubmitOrder should succeed: {e}"),
    };

    assert!(transition.new_state.drafts.is_empty());
    assert_eq!(transition.new_state.orders.len(), 1);

    let order = &transition.new_state.orders[0];
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.order_number.as_deref(), Some("PS-2026-0A1B2C"));
    assert_eq!(order.recipients.len(), 2);
}

#[test]
fn test_submit_order_round_trips_recipient_fields() {
    let state: State = state_with_draft(10);
    let draft_recipients = state.drafts[0].order.recipients.clone();

    let transition = match run(
        &state,
        Command::SubmitOrder {
            draft_id: 10,
            order_number: String::from("PS-2026-0A1B2C"),
        },
    ) {
        Ok(transition) => transition,
        Err(e) => panic!("SubmitOrder should succeed: {e}"),
    };

    let order = &transition.new_state.orders[0];
    for (submitted, drafted) in order.recipients.iter().zip(draft_recipients.iter()) {
        assert_eq!(submitted.name, drafted.name);
        assert_eq!(submitted.street_address, drafted.street_address);
        assert_eq!(submitted.city, drafted.city);
        assert_eq!(submitted.state_code, drafted.state_code);
        assert_eq!(submitted.zip_code, drafted.zip_code);
        assert_eq!(submitted.service, drafted.service);
        assert_eq!(submitted.assignment, drafted.assignment);
        assert_eq!(submitted.client_ref, drafted.client_ref);
    }
}

#[test]
fn test_submit_order_rejects_invalid_recipient() {
    let mut state: State = state_with_draft(10);
    state.drafts[0].order.recipients[0].service.process_service = false;

    let result = run(
        &state,
        Command::SubmitOrder {
            draft_id: 10,
            order_number: String::from("PS-2026-0A1B2C"),
        },
    );

    match result {
        Err(CoreError::DomainViolation(DomainError::MissingServiceMethod { .. })) => {}
        other => panic!("Expected MissingServiceMethod, got {other:?}"),
    }
}

#[test]
fn test_submit_order_rejects_guided_without_server() {
    let mut state: State = state_with_draft(10);
    state.drafts[0].order.recipients[1].assignment = proserve_domain::Assignment::new_guided();

    let result = run(
        &state,
        Command::SubmitOrder {
            draft_id: 10,
            order_number: String::from("PS-2026-0A1B2C"),
        },
    );

    match result {
        Err(CoreError::DomainViolation(DomainError::MissingAssignedServer { .. })) => {}
        other => panic!("Expected MissingAssignedServer, got {other:?}"),
    }
}

#[test]
fn test_submit_order_refuses_duplicate_order_number() {
    let mut state: State = state_with_draft(10);
    let submitted = match run(
        &state,
        Command::SubmitOrder {
            draft_id: 10,
            order_number: String::from("PS-2026-0A1B2C"),
        },
    ) {
        Ok(transition) => transition.new_state,
        Err(e) => panic!("SubmitOrder should succeed: {e}"),
    };

    // A second draft submitted under the same number must be refused.
    state = submitted;
    let mut draft = match proserve_domain::Draft::new(draft_order()) {
        Ok(draft) => draft,
        Err(e) => panic!("helper draft must be valid: {e}"),
    };
    draft.draft_id = Some(20);
    state.drafts.push(draft);

    let result = run(
        &state,
        Command::SubmitOrder {
            draft_id: 20,
            order_number: String::from("PS-2026-0A1B2C"),
        },
    );

    match result {
        Err(CoreError::Conflict { .. }) => {}
        other => panic!("Expected Conflict, got {other:?}"),
    }
}
