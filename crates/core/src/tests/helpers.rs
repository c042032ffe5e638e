// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::State;
use proserve_audit::{Actor, Cause};
use proserve_domain::{
    Assignment, Bid, Draft, Order, OrderStatus, Recipient, RecipientStatus, ServiceOptions,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

pub const TENANT_ID: i64 = 1;
pub const CUSTOMER_ID: i64 = 2;
pub const GUIDED_SERVER_ID: i64 = 7;

pub fn test_actor() -> Actor {
    Actor::new(String::from("customer-2"), String::from("customer"))
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn automated_recipient(recipient_id: i64, rush: bool) -> Recipient {
    let mut recipient: Recipient = Recipient::new(None);
    recipient.recipient_id = Some(recipient_id);
    recipient.name = format!("Automated Recipient {recipient_id}");
    recipient.street_address = String::from("100 Main St");
    recipient.city = String::from("Phoenix");
    recipient.state_code = String::from("AZ");
    recipient.zip_code = String::from("85001");
    recipient.service = ServiceOptions {
        process_service: true,
        certified_mail: false,
        rush_service: rush,
        remote_location: false,
    };
    recipient
}

pub fn guided_recipient(recipient_id: i64, server_id: i64) -> Recipient {
    let mut recipient: Recipient = automated_recipient(recipient_id, false);
    recipient.name = format!("Guided Recipient {recipient_id}");
    recipient.assignment = Assignment::Guided {
        assigned_server_id: Some(server_id),
        quoted_price: None,
        negotiated_price: None,
    };
    recipient
}

pub fn draft_order() -> Order {
    let mut order: Order = Order::new_draft(
        TENANT_ID,
        CUSTOMER_ID,
        String::from("2026-CV-000123"),
        String::from("King County Superior Court"),
        String::from("Summons"),
        OffsetDateTime::UNIX_EPOCH,
        None,
        OffsetDateTime::UNIX_EPOCH,
    );
    let mut automated: Recipient = automated_recipient(0, true);
    automated.recipient_id = None;
    automated.client_ref = Some(String::from("tmp-1"));
    let mut guided: Recipient = guided_recipient(0, GUIDED_SERVER_ID);
    guided.recipient_id = None;
    guided.client_ref = Some(String::from("tmp-2"));
    order.recipients = vec![automated, guided];
    order
}

pub fn state_with_draft(draft_id: i64) -> State {
    let mut state: State = State::new(TENANT_ID);
    let mut draft: Draft = match Draft::new(draft_order()) {
        Ok(draft) => draft,
        Err(e) => panic!("helper draft must be valid: {e}"),
    };
    draft.draft_id = Some(draft_id);
    state.drafts.push(draft);
    state
}

/// An open submitted order with one automated recipient (id 11, rush)
/// and one guided recipient (id 12, server selected but unconfirmed).
pub fn state_with_open_order(order_id: i64) -> State {
    let mut state: State = State::new(TENANT_ID);
    let mut order: Order = draft_order();
    order.order_id = Some(order_id);
    order.order_number = Some(String::from("PS-2026-0A1B2C"));
    order.status = OrderStatus::Open;
    order.recipients[0].recipient_id = Some(11);
    order.recipients[0].status = RecipientStatus::Open;
    order.recipients[1].recipient_id = Some(12);
    order.recipients[1].status = RecipientStatus::Open;
    state.orders.push(order);
    state
}

pub fn pending_bid(bid_id: i64, order_id: i64, recipient_id: i64, server_id: i64, amount: Decimal) -> Bid {
    let mut bid: Bid = match Bid::new(
        order_id,
        recipient_id,
        server_id,
        amount,
        None,
        OffsetDateTime::UNIX_EPOCH,
    ) {
        Ok(bid) => bid,
        Err(e) => panic!("helper bid must be valid: {e}"),
    };
    bid.bid_id = Some(bid_id);
    bid
}
