// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::auth::{AuthenticatedActor, Role};
use crate::handlers;
use crate::request_response::{
    CreateDraftRequest, OrderInfo, RecipientInput, SubmitBidRequest, SubmitOrderRequest,
};
use proserve_audit::Cause;
use proserve_persistence::SqlitePersistence;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

pub const TENANT_ID: i64 = 1;
pub const CUSTOMER_ID: i64 = 2;
pub const OTHER_CUSTOMER_ID: i64 = 3;
pub const ADMIN_ID: i64 = 1;
pub const SERVER_A: i64 = 31;
pub const SERVER_B: i64 = 32;
pub const GUIDED_SERVER_ID: i64 = 7;

pub fn persistence() -> SqlitePersistence {
    match SqlitePersistence::in_memory() {
        Ok(persistence) => persistence,
        Err(e) => panic!("in-memory persistence must open: {e}"),
    }
}

pub fn cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn customer() -> AuthenticatedActor {
    AuthenticatedActor::new(CUSTOMER_ID, TENANT_ID, Role::Customer)
}

pub fn other_customer() -> AuthenticatedActor {
    AuthenticatedActor::new(OTHER_CUSTOMER_ID, TENANT_ID, Role::Customer)
}

pub fn admin() -> AuthenticatedActor {
    AuthenticatedActor::new(ADMIN_ID, TENANT_ID, Role::Admin)
}

pub fn server(server_id: i64) -> AuthenticatedActor {
    AuthenticatedActor::new(server_id, TENANT_ID, Role::ProcessServer)
}

pub fn foreign_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(99, 2, Role::Admin)
}

pub fn automated_input() -> RecipientInput {
    RecipientInput {
        client_ref: Some(String::from("tmp-1")),
        name: String::from("Automated Recipient"),
        street_address: String::from("100 Main St"),
        city: String::from("Phoenix"),
        state_code: String::from("AZ"),
        zip_code: String::from("85001"),
        process_service: true,
        certified_mail: false,
        rush_service: true,
        remote_location: false,
        assignment_mode: String::from("automated"),
        assigned_server_id: None,
        quoted_price: None,
        negotiated_price: None,
    }
}

pub fn guided_input() -> RecipientInput {
    RecipientInput {
        client_ref: Some(String::from("tmp-2")),
        name: String::from("Guided Recipient"),
        street_address: String::from("200 Oak Ave"),
        city: String::from("Tucson"),
        state_code: String::from("AZ"),
        zip_code: String::from("85701"),
        process_service: true,
        certified_mail: true,
        rush_service: false,
        remote_location: false,
        assignment_mode: String::from("guided"),
        assigned_server_id: Some(GUIDED_SERVER_ID),
        quoted_price: None,
        negotiated_price: None,
    }
}

pub fn draft_request() -> CreateDraftRequest {
    CreateDraftRequest {
        case_number: String::from("2026-CV-000123"),
        jurisdiction: String::from("King County Superior Court"),
        document_type: String::from("Summons"),
        deadline: OffsetDateTime::now_utc() + Duration::hours(48),
        special_instructions: Some(String::from("Leave at front desk if refused")),
        recipients: vec![automated_input(), guided_input()],
    }
}

pub fn create_draft(persistence: &mut SqlitePersistence) -> i64 {
    match handlers::create_draft(persistence, draft_request(), &customer(), cause()) {
        Ok(response) => response.draft_id,
        Err(e) => panic!("create_draft must succeed: {e}"),
    }
}

/// Creates and submits the standard two-recipient draft, returning the
/// new order id.
pub fn submit_order(persistence: &mut SqlitePersistence) -> i64 {
    let draft_id: i64 = create_draft(persistence);
    match handlers::submit_order(
        persistence,
        SubmitOrderRequest { draft_id },
        &customer(),
        cause(),
    ) {
        Ok(response) => response.order_id,
        Err(e) => panic!("submit_order must succeed: {e}"),
    }
}

pub fn get_order(persistence: &SqlitePersistence, order_id: i64) -> OrderInfo {
    match handlers::get_order(persistence, order_id, &customer()) {
        Ok(order) => order,
        Err(e) => panic!("get_order must succeed: {e}"),
    }
}

/// The automated recipient's id on a submitted standard order.
pub fn automated_recipient_id(persistence: &SqlitePersistence, order_id: i64) -> i64 {
    let order = get_order(persistence, order_id);
    order.recipients[0].recipient_id
}

/// The guided recipient's id on a submitted standard order.
pub fn guided_recipient_id(persistence: &SqlitePersistence, order_id: i64) -> i64 {
    let order = get_order(persistence, order_id);
    order.recipients[1].recipient_id
}

/// Submits a bid from the given server, returning the bid id.
pub fn place_bid(
    persistence: &mut SqlitePersistence,
    order_id: i64,
    recipient_id: i64,
    server_id: i64,
    amount: Decimal,
) -> i64 {
    match handlers::submit_bid(
        persistence,
        SubmitBidRequest {
            order_id,
            recipient_id,
            amount,
            comment: None,
        },
        &server(server_id),
        cause(),
    ) {
        Ok(response) => response.bid_id,
        Err(e) => panic!("submit_bid must succeed: {e}"),
    }
}
