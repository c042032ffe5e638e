// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{PersistReceipt, SqlitePersistence};
use proserve::{Command, State, apply};
use proserve_audit::{Actor, Cause};
use proserve_domain::{Assignment, Order, Recipient, ServiceOptions};
use time::OffsetDateTime;

pub const TENANT_ID: i64 = 1;
pub const CUSTOMER_ID: i64 = 2;

pub fn test_actor() -> Actor {
    Actor::new(String::from("customer-2"), String::from("customer"))
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn persistence() -> SqlitePersistence {
    match SqlitePersistence::in_memory() {
        Ok(persistence) => persistence,
        Err(e) => panic!("in-memory persistence must open: {e}"),
    }
}

pub fn draft_order() -> Order {
    let mut order: Order = Order::new_draft(
        TENANT_ID,
        CUSTOMER_ID,
        String::from("2026-CV-000123"),
        String::from("King County Superior Court"),
        String::from("Summons"),
        OffsetDateTime::UNIX_EPOCH,
        Some(String::from("Leave at front desk if refused")),
        OffsetDateTime::UNIX_EPOCH,
    );

    let mut automated: Recipient = Recipient::new(Some(String::from("tmp-1")));
    automated.name = String::from("Automated Recipient");
    automated.street_address = String::from("100 Main St");
    automated.city = String::from("Phoenix");
    automated.state_code = String::from("AZ");
    automated.zip_code = String::from("85001");
    automated.service = ServiceOptions {
        process_service: true,
        certified_mail: false,
        rush_service: true,
        remote_location: false,
    };

    let mut guided: Recipient = Recipient::new(Some(String::from("tmp-2")));
    guided.name = String::from("Guided Recipient");
    guided.street_address = String::from("200 Oak Ave");
    guided.city = String::from("Tucson");
    guided.state_code = String::from("AZ");
    guided.zip_code = String::from("85701");
    guided.service = ServiceOptions {
        process_service: true,
        certified_mail: true,
        rush_service: false,
        remote_location: false,
    };
    guided.assignment = Assignment::Guided {
        assigned_server_id: Some(7),
        quoted_price: None,
        negotiated_price: None,
    };

    order.recipients = vec![automated, guided];
    order
}

/// Applies a command against the freshly loaded tenant state and
/// persists the transition, returning the receipt.
pub fn run(persistence: &mut SqlitePersistence, command: Command) -> PersistReceipt {
    let state: State = match persistence.load_state(TENANT_ID) {
        Ok(state) => state,
        Err(e) => panic!("load_state must succeed: {e}"),
    };
    let transition = match apply(&state, command, test_actor(), test_cause()) {
        Ok(transition) => transition,
        Err(e) => panic!("apply must succeed: {e}"),
    };
    match persistence.persist_transition(&transition) {
        Ok(receipt) => receipt,
        Err(e) => panic!("persist_transition must succeed: {e}"),
    }
}

/// Creates a draft and returns its assigned id.
pub fn create_draft(persistence: &mut SqlitePersistence) -> i64 {
    let receipt: PersistReceipt = run(
        persistence,
        Command::CreateDraft {
            customer_id: CUSTOMER_ID,
            order: draft_order(),
        },
    );
    match receipt.draft_id {
        Some(draft_id) => draft_id,
        None => panic!("CreateDraft must assign a draft id"),
    }
}

/// Creates and submits a draft, returning the new order's id.
pub fn submit_order(persistence: &mut SqlitePersistence, order_number: &str) -> i64 {
    let draft_id: i64 = create_draft(persistence);
    let receipt: PersistReceipt = run(
        persistence,
        Command::SubmitOrder {
            draft_id,
            order_number: order_number.to_string(),
        },
    );
    match receipt.order_id {
        Some(order_id) => order_id,
        None => panic!("SubmitOrder must assign an order id"),
    }
}
