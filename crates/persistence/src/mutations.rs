// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional writes syncing the canonical tables to a new core state.
//!
//! Every mutation runs inside the caller's transaction: the audit event
//! and the state sync commit together or not at all.

use rusqlite::{Transaction, params};
use tracing::debug;

use proserve::State;
use proserve_audit::AuditEvent;
use proserve_domain::{Order, Recipient};

use crate::codec::format_timestamp;
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::error::PersistenceError;

/// Persists an audit event within a transaction.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    tx: &Transaction<'_>,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };
    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };
    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };
    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };
    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    tx.execute(
        "INSERT INTO audit_events (
            tenant_id, subject, actor_json, cause_json, action_json,
            before_snapshot_json, after_snapshot_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.tenant_id,
            event.subject,
            serde_json::to_string(&actor_data)?,
            serde_json::to_string(&cause_data)?,
            serde_json::to_string(&action_data)?,
            serde_json::to_string(&before_data)?,
            serde_json::to_string(&after_data)?,
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

/// Syncs the drafts table to the given state.
///
/// Drafts present in the database but absent from the state are deleted
/// (discarded or submitted). Persisted drafts are updated guarded by the
/// edit sequence, so a stale payload can never overwrite a newer row
/// even if it reaches the database late. A draft without an id is
/// inserted.
///
/// # Returns
///
/// The id assigned to a newly inserted draft, if any.
///
/// # Errors
///
/// Returns an error if a database operation or serialization fails.
pub fn sync_drafts(tx: &Transaction<'_>, state: &State) -> Result<Option<i64>, PersistenceError> {
    let stored_ids: Vec<i64> = {
        let mut stmt = tx.prepare("SELECT draft_id FROM drafts WHERE tenant_id = ?1")?;
        let rows = stmt.query_map(params![state.tenant_id], |row| row.get::<_, i64>(0))?;
        rows.collect::<Result<Vec<i64>, rusqlite::Error>>()?
    };

    for stored_id in stored_ids {
        if state.draft_by_id(stored_id).is_none() {
            tx.execute("DELETE FROM drafts WHERE draft_id = ?1", params![stored_id])?;
            debug!(draft_id = stored_id, "Deleted draft no longer in state");
        }
    }

    let mut new_draft_id: Option<i64> = None;
    for draft in &state.drafts {
        let order_json: String = serde_json::to_string(&draft.order)?;
        match draft.draft_id {
            Some(draft_id) => {
                // The sequence guard makes the row monotonic under
                // overlapping saves regardless of arrival order.
                tx.execute(
                    "UPDATE drafts SET edit_seq = ?1, order_json = ?2
                     WHERE draft_id = ?3 AND edit_seq <= ?1",
                    params![draft.edit_seq, order_json, draft_id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO drafts (tenant_id, customer_id, edit_seq, order_json)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        state.tenant_id,
                        draft.order.customer_id,
                        draft.edit_seq,
                        order_json
                    ],
                )?;
                new_draft_id = Some(tx.last_insert_rowid());
                debug!(draft_id = new_draft_id, "Inserted new draft");
            }
        }
    }

    Ok(new_draft_id)
}

/// Syncs the orders and recipients tables to the given state.
///
/// Submitted orders are upserted by id; recipients are never deleted,
/// only inserted (at submission) or updated. An order without an id is a
/// fresh submission and is inserted together with its recipients.
///
/// # Returns
///
/// The id assigned to a newly inserted order, if any.
///
/// # Errors
///
/// Returns an error if a database operation or serialization fails, or
/// if a submitted order is missing its order number.
pub fn sync_orders(tx: &Transaction<'_>, state: &State) -> Result<Option<i64>, PersistenceError> {
    let mut new_order_id: Option<i64> = None;

    for order in &state.orders {
        match order.order_id {
            Some(order_id) => {
                update_order_row(tx, order_id, order)?;
                for (position, recipient) in order.recipients.iter().enumerate() {
                    match recipient.recipient_id {
                        Some(recipient_id) => update_recipient_row(tx, recipient_id, recipient)?,
                        None => {
                            insert_recipient_row(tx, order_id, position, recipient)?;
                        }
                    }
                }
            }
            None => {
                let order_id: i64 = insert_order_row(tx, state.tenant_id, order)?;
                for (position, recipient) in order.recipients.iter().enumerate() {
                    insert_recipient_row(tx, order_id, position, recipient)?;
                }
                new_order_id = Some(order_id);
                debug!(order_id, "Inserted submitted order");
            }
        }
    }

    Ok(new_order_id)
}

/// Syncs the bids table to the given state.
///
/// Bids are append-only: existing rows only ever change status, and no
/// bid is ever deleted.
///
/// # Returns
///
/// The id assigned to a newly inserted bid, if any.
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub fn sync_bids(tx: &Transaction<'_>, state: &State) -> Result<Option<i64>, PersistenceError> {
    let mut new_bid_id: Option<i64> = None;

    for bid in &state.bids {
        match bid.bid_id {
            Some(bid_id) => {
                tx.execute(
                    "UPDATE bids SET status = ?1 WHERE bid_id = ?2",
                    params![bid.status.as_str(), bid_id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO bids (
                        order_id, recipient_id, process_server_id, amount,
                        comment, status, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        bid.order_id,
                        bid.recipient_id,
                        bid.process_server_id,
                        bid.amount.to_string(),
                        bid.comment,
                        bid.status.as_str(),
                        format_timestamp(bid.created_at)?,
                    ],
                )?;
                new_bid_id = Some(tx.last_insert_rowid());
                debug!(bid_id = new_bid_id, "Inserted new bid");
            }
        }
    }

    Ok(new_bid_id)
}

fn insert_order_row(
    tx: &Transaction<'_>,
    tenant_id: i64,
    order: &Order,
) -> Result<i64, PersistenceError> {
    let Some(order_number) = &order.order_number else {
        return Err(PersistenceError::ReconstructionError(String::from(
            "submitted order is missing an order number",
        )));
    };

    tx.execute(
        "INSERT INTO orders (
            tenant_id, customer_id, order_number, case_number, jurisdiction,
            document_type, deadline, special_instructions, status,
            created_at, completed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            tenant_id,
            order.customer_id,
            order_number,
            order.case_number,
            order.jurisdiction,
            order.document_type,
            format_timestamp(order.deadline)?,
            order.special_instructions,
            order.status.as_str(),
            format_timestamp(order.created_at)?,
            order
                .completed_at
                .map(format_timestamp)
                .transpose()?,
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

fn update_order_row(
    tx: &Transaction<'_>,
    order_id: i64,
    order: &Order,
) -> Result<(), PersistenceError> {
    tx.execute(
        "UPDATE orders SET
            case_number = ?1, jurisdiction = ?2, document_type = ?3,
            deadline = ?4, special_instructions = ?5, status = ?6,
            completed_at = ?7
         WHERE order_id = ?8",
        params![
            order.case_number,
            order.jurisdiction,
            order.document_type,
            format_timestamp(order.deadline)?,
            order.special_instructions,
            order.status.as_str(),
            order
                .completed_at
                .map(format_timestamp)
                .transpose()?,
            order_id,
        ],
    )?;
    Ok(())
}

fn insert_recipient_row(
    tx: &Transaction<'_>,
    order_id: i64,
    position: usize,
    recipient: &Recipient,
) -> Result<i64, PersistenceError> {
    tx.execute(
        "INSERT INTO recipients (
            order_id, position, client_ref, name, street_address, city,
            state_code, zip_code, process_service, certified_mail,
            rush_service, remote_location, assignment_json, price_status,
            final_agreed_price, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            order_id,
            position as i64,
            recipient.client_ref,
            recipient.name,
            recipient.street_address,
            recipient.city,
            recipient.state_code,
            recipient.zip_code,
            i32::from(recipient.service.process_service),
            i32::from(recipient.service.certified_mail),
            i32::from(recipient.service.rush_service),
            i32::from(recipient.service.remote_location),
            serde_json::to_string(&recipient.assignment)?,
            recipient.price_status.as_str(),
            recipient.final_agreed_price.map(|p| p.to_string()),
            recipient.status.as_str(),
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

fn update_recipient_row(
    tx: &Transaction<'_>,
    recipient_id: i64,
    recipient: &Recipient,
) -> Result<(), PersistenceError> {
    tx.execute(
        "UPDATE recipients SET
            name = ?1, street_address = ?2, city = ?3, state_code = ?4,
            zip_code = ?5, process_service = ?6, certified_mail = ?7,
            rush_service = ?8, remote_location = ?9, assignment_json = ?10,
            price_status = ?11, final_agreed_price = ?12, status = ?13
         WHERE recipient_id = ?14",
        params![
            recipient.name,
            recipient.street_address,
            recipient.city,
            recipient.state_code,
            recipient.zip_code,
            i32::from(recipient.service.process_service),
            i32::from(recipient.service.certified_mail),
            i32::from(recipient.service.rush_service),
            i32::from(recipient.service.remote_location),
            serde_json::to_string(&recipient.assignment)?,
            recipient.price_status.as_str(),
            recipient.final_agreed_price.map(|p| p.to_string()),
            recipient.status.as_str(),
            recipient_id,
        ],
    )?;
    Ok(())
}
