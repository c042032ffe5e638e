// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side queries reconstructing domain state from the canonical
//! tables.

use rusqlite::{Connection, params};
use std::str::FromStr;

use proserve::State;
use proserve_domain::{
    Assignment, Bid, BidStatus, Draft, Order, OrderStatus, PriceStatus, Recipient,
    RecipientStatus, ServiceOptions,
};

use crate::codec::{parse_decimal, parse_timestamp};
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::error::PersistenceError;

const ORDER_COLUMNS: &str = "order_id, tenant_id, customer_id, order_number, case_number, \
     jurisdiction, document_type, deadline, special_instructions, status, created_at, \
     completed_at";

/// How to sort an order listing. Callers supply this explicitly; the
/// persistence layer holds no session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    /// Newest orders first.
    #[default]
    CreatedAtDesc,
    /// Oldest orders first.
    CreatedAtAsc,
    /// Soonest deadline first.
    DeadlineAsc,
    /// Latest deadline first.
    DeadlineDesc,
}

impl OrderSort {
    const fn order_by_clause(self) -> &'static str {
        match self {
            Self::CreatedAtDesc => "created_at DESC, order_id DESC",
            Self::CreatedAtAsc => "created_at ASC, order_id ASC",
            Self::DeadlineAsc => "deadline ASC, order_id ASC",
            Self::DeadlineDesc => "deadline DESC, order_id DESC",
        }
    }
}

/// A stored audit event, as reconstructed from the audit tables.
#[derive(Debug, Clone)]
pub struct StoredAuditEvent {
    /// The event id assigned at persistence.
    pub event_id: i64,
    /// The tenant in scope.
    pub tenant_id: i64,
    /// The order number or draft reference in scope.
    pub subject: String,
    /// The recorded actor.
    pub actor: ActorData,
    /// The recorded cause.
    pub cause: CauseData,
    /// The recorded action.
    pub action: ActionData,
    /// The state snapshot before the transition.
    pub before: StateSnapshotData,
    /// The state snapshot after the transition.
    pub after: StateSnapshotData,
}

struct OrderRow {
    order_id: i64,
    tenant_id: i64,
    customer_id: i64,
    order_number: String,
    case_number: String,
    jurisdiction: String,
    document_type: String,
    deadline: String,
    special_instructions: Option<String>,
    status: String,
    created_at: String,
    completed_at: Option<String>,
}

struct RecipientRow {
    recipient_id: i64,
    client_ref: Option<String>,
    name: String,
    street_address: String,
    city: String,
    state_code: String,
    zip_code: String,
    process_service: i64,
    certified_mail: i64,
    rush_service: i64,
    remote_location: i64,
    assignment_json: String,
    price_status: String,
    final_agreed_price: Option<String>,
    status: String,
}

struct BidRow {
    bid_id: i64,
    order_id: i64,
    recipient_id: i64,
    process_server_id: i64,
    amount: String,
    comment: Option<String>,
    status: String,
    created_at: String,
}

fn order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok(OrderRow {
        order_id: row.get(0)?,
        tenant_id: row.get(1)?,
        customer_id: row.get(2)?,
        order_number: row.get(3)?,
        case_number: row.get(4)?,
        jurisdiction: row.get(5)?,
        document_type: row.get(6)?,
        deadline: row.get(7)?,
        special_instructions: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
        completed_at: row.get(11)?,
    })
}

fn recipient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecipientRow> {
    Ok(RecipientRow {
        recipient_id: row.get(0)?,
        client_ref: row.get(1)?,
        name: row.get(2)?,
        street_address: row.get(3)?,
        city: row.get(4)?,
        state_code: row.get(5)?,
        zip_code: row.get(6)?,
        process_service: row.get(7)?,
        certified_mail: row.get(8)?,
        rush_service: row.get(9)?,
        remote_location: row.get(10)?,
        assignment_json: row.get(11)?,
        price_status: row.get(12)?,
        final_agreed_price: row.get(13)?,
        status: row.get(14)?,
    })
}

fn bid_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BidRow> {
    Ok(BidRow {
        bid_id: row.get(0)?,
        order_id: row.get(1)?,
        recipient_id: row.get(2)?,
        process_server_id: row.get(3)?,
        amount: row.get(4)?,
        comment: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn reconstruction<E: std::fmt::Display>(err: E) -> PersistenceError {
    PersistenceError::ReconstructionError(err.to_string())
}

fn recipient_from_row(row: RecipientRow) -> Result<Recipient, PersistenceError> {
    Ok(Recipient {
        recipient_id: Some(row.recipient_id),
        client_ref: row.client_ref,
        name: row.name,
        street_address: row.street_address,
        city: row.city,
        state_code: row.state_code,
        zip_code: row.zip_code,
        service: ServiceOptions {
            process_service: row.process_service != 0,
            certified_mail: row.certified_mail != 0,
            rush_service: row.rush_service != 0,
            remote_location: row.remote_location != 0,
        },
        assignment: serde_json::from_str::<Assignment>(&row.assignment_json)?,
        price_status: PriceStatus::from_str(&row.price_status).map_err(reconstruction)?,
        final_agreed_price: row
            .final_agreed_price
            .as_deref()
            .map(parse_decimal)
            .transpose()?,
        status: RecipientStatus::from_str(&row.status).map_err(reconstruction)?,
    })
}

fn load_recipients(conn: &Connection, order_id: i64) -> Result<Vec<Recipient>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT recipient_id, client_ref, name, street_address, city, state_code,
                zip_code, process_service, certified_mail, rush_service,
                remote_location, assignment_json, price_status,
                final_agreed_price, status
         FROM recipients WHERE order_id = ?1 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map(params![order_id], recipient_row)?;

    let mut recipients: Vec<Recipient> = Vec::new();
    for row in rows {
        recipients.push(recipient_from_row(row?)?);
    }
    Ok(recipients)
}

fn order_from_row(conn: &Connection, row: OrderRow) -> Result<Order, PersistenceError> {
    let recipients: Vec<Recipient> = load_recipients(conn, row.order_id)?;
    Ok(Order {
        order_id: Some(row.order_id),
        order_number: Some(row.order_number),
        tenant_id: row.tenant_id,
        customer_id: row.customer_id,
        case_number: row.case_number,
        jurisdiction: row.jurisdiction,
        document_type: row.document_type,
        deadline: parse_timestamp(&row.deadline)?,
        special_instructions: row.special_instructions,
        status: OrderStatus::from_str(&row.status).map_err(reconstruction)?,
        recipients,
        created_at: parse_timestamp(&row.created_at)?,
        completed_at: row
            .completed_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
    })
}

fn bid_from_row(row: BidRow) -> Result<Bid, PersistenceError> {
    Ok(Bid {
        bid_id: Some(row.bid_id),
        order_id: row.order_id,
        recipient_id: row.recipient_id,
        process_server_id: row.process_server_id,
        amount: parse_decimal(&row.amount)?,
        comment: row.comment,
        status: BidStatus::from_str(&row.status).map_err(reconstruction)?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

/// Loads the full coordination state for a tenant.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value cannot be
/// reconstructed.
pub fn load_state(conn: &Connection, tenant_id: i64) -> Result<State, PersistenceError> {
    let mut state: State = State::new(tenant_id);

    {
        let mut stmt = conn
            .prepare("SELECT draft_id, edit_seq, order_json FROM drafts WHERE tenant_id = ?1")?;
        let rows = stmt.query_map(params![tenant_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (draft_id, edit_seq, order_json) = row?;
            let order: Order = serde_json::from_str(&order_json)?;
            state.drafts.push(Draft {
                draft_id: Some(draft_id),
                edit_seq,
                order,
            });
        }
    }

    {
        let sql: String =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE tenant_id = ?1 ORDER BY order_id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![tenant_id], order_row)?;
        let collected: Vec<OrderRow> = rows.collect::<Result<Vec<OrderRow>, rusqlite::Error>>()?;
        for row in collected {
            let order: Order = order_from_row(conn, row)?;
            state.orders.push(order);
        }
    }

    {
        let mut stmt = conn.prepare(
            "SELECT b.bid_id, b.order_id, b.recipient_id, b.process_server_id,
                    b.amount, b.comment, b.status, b.created_at
             FROM bids b
             JOIN orders o ON o.order_id = b.order_id
             WHERE o.tenant_id = ?1
             ORDER BY b.bid_id ASC",
        )?;
        let rows = stmt.query_map(params![tenant_id], bid_row)?;
        for row in rows {
            state.bids.push(bid_from_row(row?)?);
        }
    }

    Ok(state)
}

/// Loads a draft by id.
///
/// # Errors
///
/// Returns `NotFound` if the draft does not exist, or a reconstruction
/// error if its payload is invalid.
pub fn draft_by_id(conn: &Connection, draft_id: i64) -> Result<Draft, PersistenceError> {
    let (edit_seq, order_json): (i64, String) = conn
        .query_row(
            "SELECT edit_seq, order_json FROM drafts WHERE draft_id = ?1",
            params![draft_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                PersistenceError::NotFound(format!("draft {draft_id}"))
            }
            other => PersistenceError::from(other),
        })?;

    let order: Order = serde_json::from_str(&order_json)?;
    Ok(Draft {
        draft_id: Some(draft_id),
        edit_seq,
        order,
    })
}

/// Loads a single order (with recipients) by id.
///
/// # Errors
///
/// Returns `NotFound` if the order does not exist, or a reconstruction
/// error if a stored value is invalid.
pub fn order_by_id(conn: &Connection, order_id: i64) -> Result<Order, PersistenceError> {
    let sql: String = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?1");
    let row: OrderRow = conn
        .query_row(&sql, params![order_id], order_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                PersistenceError::NotFound(format!("order {order_id}"))
            }
            other => PersistenceError::from(other),
        })?;

    order_from_row(conn, row)
}

/// Lists a tenant's orders with an optional status filter and an
/// explicit sort.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value cannot be
/// reconstructed.
pub fn list_orders(
    conn: &Connection,
    tenant_id: i64,
    status: Option<OrderStatus>,
    sort: OrderSort,
) -> Result<Vec<Order>, PersistenceError> {
    let rows: Vec<OrderRow> = match status {
        Some(status) => {
            let sql: String = format!(
                "SELECT {ORDER_COLUMNS} FROM orders
                 WHERE tenant_id = ?1 AND status = ?2
                 ORDER BY {}",
                sort.order_by_clause()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![tenant_id, status.as_str()], order_row)?;
            rows.collect::<Result<Vec<OrderRow>, rusqlite::Error>>()?
        }
        None => {
            let sql: String = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE tenant_id = ?1 ORDER BY {}",
                sort.order_by_clause()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![tenant_id], order_row)?;
            rows.collect::<Result<Vec<OrderRow>, rusqlite::Error>>()?
        }
    };

    let mut orders: Vec<Order> = Vec::new();
    for row in rows {
        orders.push(order_from_row(conn, row)?);
    }
    Ok(orders)
}

/// Returns the most recent audit events for a tenant, newest first.
///
/// # Errors
///
/// Returns an error if a query fails or a stored event cannot be
/// deserialized.
pub fn audit_timeline(
    conn: &Connection,
    tenant_id: i64,
    limit: u32,
) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT event_id, tenant_id, subject, actor_json, cause_json,
                action_json, before_snapshot_json, after_snapshot_json
         FROM audit_events
         WHERE tenant_id = ?1
         ORDER BY event_id DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![tenant_id, limit], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut events: Vec<StoredAuditEvent> = Vec::new();
    for row in rows {
        let (event_id, tenant, subject, actor_json, cause_json, action_json, before_json, after_json) =
            row?;
        events.push(StoredAuditEvent {
            event_id,
            tenant_id: tenant,
            subject,
            actor: serde_json::from_str(&actor_json)?,
            cause: serde_json::from_str(&cause_json)?,
            action: serde_json::from_str(&action_json)?,
            before: serde_json::from_str(&before_json)?,
            after: serde_json::from_str(&after_json)?,
        });
    }
    Ok(events)
}
