// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The transition engine: applies commands to the current state.
//!
//! Every arm validates against the state it is given, so callers that
//! reload state under their write lock get commit-time re-validation for
//! free: a bid-acceptance race or an edit racing a status change loses
//! here with a `Conflict`, never with a silent overwrite.

use crate::command::{AttemptOutcome, Command};
use crate::editability::{Editability, can_edit, check_recipient_patch};
use crate::error::CoreError;
use crate::state::{State, TransitionResult};
use proserve_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use proserve_domain::{
    Assignment, AssignmentMode, Bid, BidStatus, DomainError, Draft, Order, OrderPatch, OrderStatus,
    PriceStatus, RecipientStatus, compute_price, derive_order_status, validate_order_patch,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Applies a command to the current state, producing a new state and
/// audit event.
///
/// # Arguments
///
/// * `state` - The current state (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if the command violates domain rules, references an
/// unknown entity, or loses a concurrency race against the given state.
pub fn apply(
    state: &State,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::CreateDraft { customer_id, order } => {
            apply_create_draft(state, customer_id, order, actor, cause)
        }
        Command::SaveDraft {
            draft_id,
            edit_seq,
            order,
        } => apply_save_draft(state, draft_id, edit_seq, order, actor, cause),
        Command::DiscardDraft { draft_id } => apply_discard_draft(state, draft_id, actor, cause),
        Command::SubmitOrder {
            draft_id,
            order_number,
        } => apply_submit_order(state, draft_id, order_number, actor, cause),
        Command::UpdateOrder { order_id, patch } => {
            apply_update_order(state, order_id, patch, actor, cause)
        }
        Command::ConfirmAssignment {
            order_id,
            recipient_id,
        } => apply_confirm_assignment(state, order_id, recipient_id, actor, cause),
        Command::SubmitBid {
            order_id,
            recipient_id,
            process_server_id,
            amount,
            comment,
            submitted_at,
        } => apply_submit_bid(
            state,
            order_id,
            recipient_id,
            process_server_id,
            amount,
            comment,
            submitted_at,
            actor,
            cause,
        ),
        Command::AcceptBid { bid_id } => apply_accept_bid(state, bid_id, actor, cause),
        Command::RejectBid { bid_id } => apply_reject_bid(state, bid_id, actor, cause),
        Command::RecordDeliveryAttempt {
            order_id,
            recipient_id,
            outcome,
            attempted_at,
        } => apply_record_attempt(
            state,
            order_id,
            recipient_id,
            outcome,
            attempted_at,
            actor,
            cause,
        ),
        Command::CancelOrder { order_id } => apply_cancel_order(state, order_id, actor, cause),
    }
}

fn build_event(
    state: &State,
    new_state: &State,
    actor: Actor,
    cause: Cause,
    name: &str,
    details: String,
    subject: String,
) -> AuditEvent {
    let before: StateSnapshot = state.to_snapshot();
    let after: StateSnapshot = new_state.to_snapshot();
    let action: Action = Action::new(name.to_string(), Some(details));
    AuditEvent::new(
        actor,
        cause,
        action,
        before,
        after,
        state.tenant_id,
        subject,
    )
}

fn order_subject(order: &Order) -> String {
    order.order_number.as_ref().map_or_else(
        || {
            order
                .order_id
                .map_or_else(|| String::from("order-unsaved"), |id| format!("order-{id}"))
        },
        Clone::clone,
    )
}

fn draft_subject(draft_id: i64) -> String {
    format!("draft-{draft_id}")
}

fn apply_create_draft(
    state: &State,
    customer_id: i64,
    mut order: Order,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    // The draft's identity fields come from the command context, not the
    // payload.
    order.order_id = None;
    order.tenant_id = state.tenant_id;
    order.customer_id = customer_id;

    let draft: Draft = Draft::new(order)?;

    let mut new_state: State = state.clone();
    new_state.drafts.push(draft);

    let details: String = format!("Created draft for customer {customer_id}");
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "CreateDraft",
        details,
        String::from("draft-new"),
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_save_draft(
    state: &State,
    draft_id: i64,
    edit_seq: i64,
    payload: Order,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(draft) = state.draft_by_id(draft_id) else {
        return Err(CoreError::NotFound {
            resource: format!("draft {draft_id}"),
        });
    };

    if let Some(order_number) = &payload.order_number {
        return Err(CoreError::DomainViolation(
            DomainError::OrderNumberAlreadyAssigned {
                order_number: order_number.clone(),
            },
        ));
    }

    if !draft.accepts_edit_seq(edit_seq) {
        // A stale or duplicate payload is acknowledged without being
        // applied; the stored draft already reflects a newer edit.
        let details: String = format!(
            "Ignored save at sequence {edit_seq}; draft {draft_id} is at sequence {}",
            draft.edit_seq
        );
        let new_state: State = state.clone();
        let audit_event: AuditEvent = build_event(
            state,
            &new_state,
            actor,
            cause,
            "SaveDraft",
            details,
            draft_subject(draft_id),
        );
        return Ok(TransitionResult {
            new_state,
            audit_event,
        });
    }

    let mut new_state: State = state.clone();
    if let Some(stored) = new_state
        .drafts
        .iter_mut()
        .find(|d| d.draft_id == Some(draft_id))
    {
        let mut content: Order = payload;
        // Draft identity is fixed at creation; the payload cannot move a
        // draft between tenants, customers, or lifecycle states.
        content.order_id = None;
        content.status = OrderStatus::Draft;
        content.tenant_id = stored.order.tenant_id;
        content.customer_id = stored.order.customer_id;
        content.created_at = stored.order.created_at;
        stored.order = content;
        stored.edit_seq = edit_seq;
    }

    let details: String = format!("Saved draft {draft_id} at sequence {edit_seq}");
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "SaveDraft",
        details,
        draft_subject(draft_id),
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_discard_draft(
    state: &State,
    draft_id: i64,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    if state.draft_by_id(draft_id).is_none() {
        return Err(CoreError::NotFound {
            resource: format!("draft {draft_id}"),
        });
    }

    let mut new_state: State = state.clone();
    new_state.drafts.retain(|d| d.draft_id != Some(draft_id));

    let details: String = format!("Discarded draft {draft_id}");
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "DiscardDraft",
        details,
        draft_subject(draft_id),
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_submit_order(
    state: &State,
    draft_id: i64,
    order_number: String,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(draft) = state.draft_by_id(draft_id) else {
        return Err(CoreError::NotFound {
            resource: format!("draft {draft_id}"),
        });
    };

    draft.order.validate_for_submission()?;

    if state
        .orders
        .iter()
        .any(|o| o.order_number.as_deref() == Some(order_number.as_str()))
    {
        return Err(CoreError::Conflict {
            reason: format!("order number '{order_number}' is already in use"),
        });
    }

    let mut order: Order = draft.order.clone();
    order.order_number = Some(order_number.clone());
    order.status = OrderStatus::Open;
    for recipient in &mut order.recipients {
        recipient.status = RecipientStatus::Open;
    }
    let recipient_count: usize = order.recipients.len();

    let mut new_state: State = state.clone();
    new_state.drafts.retain(|d| d.draft_id != Some(draft_id));
    new_state.orders.push(order);

    let details: String = format!(
        "Submitted draft {draft_id} as order {order_number} with {recipient_count} recipient(s)"
    );
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "SubmitOrder",
        details,
        order_number,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

#[allow(clippy::too_many_lines)]
fn apply_update_order(
    state: &State,
    order_id: i64,
    patch: OrderPatch,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(order) = state.order_by_id(order_id) else {
        return Err(CoreError::NotFound {
            resource: format!("order {order_id}"),
        });
    };

    // Commit-time editability check; the status may have advanced since
    // the edit surface was opened.
    let editability: Editability = can_edit(order);
    if !editability.allowed {
        return Err(CoreError::Conflict {
            reason: editability
                .lock_reason
                .unwrap_or_else(|| String::from("order is locked")),
        });
    }

    validate_order_patch(order, &patch)?;

    let mut updated: Order = order.clone();
    let mut left_bidding: Vec<i64> = Vec::new();

    // The whole patch validates or nothing applies: any failure below
    // returns before the new state is assembled.
    for recipient_patch in &patch.recipients {
        let Some(recipient_id) = recipient_patch.recipient_id else {
            return Err(CoreError::DomainViolation(
                DomainError::RecipientPatchMissingId,
            ));
        };
        let Some(index) = updated.recipient_index(recipient_id) else {
            return Err(CoreError::DomainViolation(DomainError::RecipientNotFound {
                recipient_id,
            }));
        };

        check_recipient_patch(&updated.recipients[index], recipient_patch)?;

        let was_automated: bool =
            updated.recipients[index].assignment.mode() == AssignmentMode::Automated;
        let merged = recipient_patch.apply_to(&updated.recipients[index])?;
        let now_guided: bool = merged.assignment.mode() == AssignmentMode::Guided;
        updated.recipients[index] = merged;

        if was_automated && now_guided {
            // Leaving bidding mode orphans any pending bids.
            left_bidding.push(recipient_id);
            if updated.recipients[index].status == RecipientStatus::Bidding {
                updated.recipients[index].status = RecipientStatus::Open;
            }
        }
    }

    if let Some(case_number) = patch.case_number {
        updated.case_number = case_number;
    }
    if let Some(jurisdiction) = patch.jurisdiction {
        updated.jurisdiction = jurisdiction;
    }
    if let Some(document_type) = patch.document_type {
        updated.document_type = document_type;
    }
    if let Some(deadline) = patch.deadline {
        updated.deadline = deadline;
    }
    if let Some(special_instructions) = patch.special_instructions {
        updated.special_instructions = Some(special_instructions);
    }

    updated.status = derive_order_status(&updated.recipients);
    let subject: String = order_subject(&updated);

    let mut new_state: State = state.clone();
    let mut rejected_bids: usize = 0;
    for bid in &mut new_state.bids {
        if bid.status == BidStatus::Pending && left_bidding.contains(&bid.recipient_id) {
            bid.status = BidStatus::Rejected;
            rejected_bids += 1;
        }
    }
    if let Some(slot) = new_state
        .orders
        .iter_mut()
        .find(|o| o.order_id == Some(order_id))
    {
        *slot = updated;
    }

    let details: String = if rejected_bids == 0 {
        format!("Updated order {order_id}")
    } else {
        format!("Updated order {order_id}; rejected {rejected_bids} orphaned pending bid(s)")
    };
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "UpdateOrder",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_confirm_assignment(
    state: &State,
    order_id: i64,
    recipient_id: i64,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(order) = state.order_by_id(order_id) else {
        return Err(CoreError::NotFound {
            resource: format!("order {order_id}"),
        });
    };
    if order.status.is_terminal() {
        return Err(CoreError::Conflict {
            reason: format!("order is {}", order.status),
        });
    }
    let Some(index) = order.recipient_index(recipient_id) else {
        return Err(CoreError::NotFound {
            resource: format!("recipient {recipient_id} on order {order_id}"),
        });
    };

    let recipient = &order.recipients[index];
    let Assignment::Guided {
        assigned_server_id: Some(server_id),
        ..
    } = recipient.assignment
    else {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is not a guided recipient with a selected server",
                recipient.display_ref()
            ),
        });
    };
    if recipient.status != RecipientStatus::Open {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is {}; confirmation requires an open recipient",
                recipient.display_ref(),
                recipient.status
            ),
        });
    }

    let mut new_state: State = state.clone();
    let subject: String = order_subject(order);
    if let Some(slot) = new_state
        .orders
        .iter_mut()
        .find(|o| o.order_id == Some(order_id))
    {
        let confirmed = &mut slot.recipients[index];
        confirmed.status = RecipientStatus::Assigned;
        confirmed.price_status = PriceStatus::Accepted;
        confirmed.final_agreed_price = Some(compute_price(confirmed).due_now);
        slot.status = derive_order_status(&slot.recipients);
    }

    let details: String =
        format!("Confirmed server {server_id} for recipient {recipient_id} on order {order_id}");
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "ConfirmAssignment",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

#[allow(clippy::too_many_arguments)]
fn apply_submit_bid(
    state: &State,
    order_id: i64,
    recipient_id: i64,
    process_server_id: i64,
    amount: Decimal,
    comment: Option<String>,
    submitted_at: OffsetDateTime,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(order) = state.order_by_id(order_id) else {
        return Err(CoreError::NotFound {
            resource: format!("order {order_id}"),
        });
    };
    if order.status.is_terminal() {
        return Err(CoreError::Conflict {
            reason: format!("order is {}", order.status),
        });
    }
    let Some(index) = order.recipient_index(recipient_id) else {
        return Err(CoreError::NotFound {
            resource: format!("recipient {recipient_id} on order {order_id}"),
        });
    };

    let recipient = &order.recipients[index];
    if recipient.assignment.mode() != AssignmentMode::Automated {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is guided; bidding is not open",
                recipient.display_ref()
            ),
        });
    }
    if !matches!(
        recipient.status,
        RecipientStatus::Open | RecipientStatus::Bidding
    ) {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is {}; bidding is closed",
                recipient.display_ref(),
                recipient.status
            ),
        });
    }
    if state.has_pending_bid(recipient_id, process_server_id) {
        return Err(CoreError::DomainViolation(DomainError::DuplicatePendingBid {
            process_server_id,
        }));
    }

    let bid: Bid = Bid::new(
        order_id,
        recipient_id,
        process_server_id,
        amount,
        comment,
        submitted_at,
    )?;

    let mut new_state: State = state.clone();
    let subject: String = order_subject(order);
    new_state.bids.push(bid);
    if let Some(slot) = new_state
        .orders
        .iter_mut()
        .find(|o| o.order_id == Some(order_id))
    {
        if slot.recipients[index].status == RecipientStatus::Open {
            slot.recipients[index].status = RecipientStatus::Bidding;
        }
        slot.status = derive_order_status(&slot.recipients);
    }

    let details: String = format!(
        "Server {process_server_id} bid {amount} on recipient {recipient_id} of order {order_id}"
    );
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "SubmitBid",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_accept_bid(
    state: &State,
    bid_id: i64,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(bid) = state.bid_by_id(bid_id) else {
        return Err(CoreError::NotFound {
            resource: format!("bid {bid_id}"),
        });
    };
    if bid.status != BidStatus::Pending {
        return Err(CoreError::Conflict {
            reason: format!("bid {bid_id} is {}; only pending bids can be accepted", bid.status),
        });
    }
    let Some(order) = state.order_by_id(bid.order_id) else {
        return Err(CoreError::NotFound {
            resource: format!("order {}", bid.order_id),
        });
    };
    if order.status.is_terminal() {
        return Err(CoreError::Conflict {
            reason: format!("order is {}", order.status),
        });
    }
    let Some(index) = order.recipient_index(bid.recipient_id) else {
        return Err(CoreError::NotFound {
            resource: format!("recipient {} on order {}", bid.recipient_id, bid.order_id),
        });
    };

    let recipient = &order.recipients[index];
    // Commit-time re-validation: a concurrent acceptance (or a mode
    // switch) may have advanced the recipient since this bid was read.
    match recipient.assignment {
        Assignment::Automated {
            accepted_server_id: None,
            ..
        } => {}
        _ => {
            return Err(CoreError::Conflict {
                reason: format!(
                    "recipient '{}' already has a bound server",
                    recipient.display_ref()
                ),
            });
        }
    }
    if !matches!(
        recipient.status,
        RecipientStatus::Open | RecipientStatus::Bidding
    ) {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is {}; acceptance requires an open or bidding recipient",
                recipient.display_ref(),
                recipient.status
            ),
        });
    }

    let mut new_state: State = state.clone();
    let subject: String = order_subject(order);
    let mut rejected_bids: usize = 0;
    for other in &mut new_state.bids {
        if other.bid_id == Some(bid_id) {
            other.status = BidStatus::Accepted;
        } else if other.recipient_id == bid.recipient_id && other.status == BidStatus::Pending {
            other.status = BidStatus::Rejected;
            rejected_bids += 1;
        }
    }
    if let Some(slot) = new_state
        .orders
        .iter_mut()
        .find(|o| o.order_id == Some(bid.order_id))
    {
        let bound = &mut slot.recipients[index];
        bound.assignment = Assignment::Automated {
            accepted_server_id: Some(bid.process_server_id),
            accepted_amount: Some(bid.amount),
        };
        bound.status = RecipientStatus::Assigned;
        bound.price_status = PriceStatus::Accepted;
        bound.final_agreed_price = Some(compute_price(bound).due_now);
        slot.status = derive_order_status(&slot.recipients);
    }

    let details: String = format!(
        "Accepted bid {bid_id} from server {} at {}; rejected {rejected_bids} other pending bid(s)",
        bid.process_server_id, bid.amount
    );
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "AcceptBid",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_reject_bid(
    state: &State,
    bid_id: i64,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(bid) = state.bid_by_id(bid_id) else {
        return Err(CoreError::NotFound {
            resource: format!("bid {bid_id}"),
        });
    };
    if bid.status != BidStatus::Pending {
        return Err(CoreError::Conflict {
            reason: format!("bid {bid_id} is {}; only pending bids can be rejected", bid.status),
        });
    }

    let subject: String = state
        .order_by_id(bid.order_id)
        .map_or_else(|| format!("order-{}", bid.order_id), order_subject);

    let mut new_state: State = state.clone();
    if let Some(slot) = new_state.bids.iter_mut().find(|b| b.bid_id == Some(bid_id)) {
        slot.status = BidStatus::Rejected;
    }

    let details: String = format!(
        "Rejected bid {bid_id} from server {} on recipient {}",
        bid.process_server_id, bid.recipient_id
    );
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "RejectBid",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_record_attempt(
    state: &State,
    order_id: i64,
    recipient_id: i64,
    outcome: AttemptOutcome,
    attempted_at: OffsetDateTime,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(order) = state.order_by_id(order_id) else {
        return Err(CoreError::NotFound {
            resource: format!("order {order_id}"),
        });
    };
    if order.status.is_terminal() {
        return Err(CoreError::Conflict {
            reason: format!("order is {}", order.status),
        });
    }
    let Some(index) = order.recipient_index(recipient_id) else {
        return Err(CoreError::NotFound {
            resource: format!("recipient {recipient_id} on order {order_id}"),
        });
    };

    let recipient = &order.recipients[index];
    if !matches!(
        recipient.status,
        RecipientStatus::Assigned | RecipientStatus::InProgress
    ) {
        return Err(CoreError::Conflict {
            reason: format!(
                "recipient '{}' is {}; delivery attempts require a bound server",
                recipient.display_ref(),
                recipient.status
            ),
        });
    }

    let new_recipient_status: RecipientStatus = match outcome {
        AttemptOutcome::Attempted => RecipientStatus::InProgress,
        AttemptOutcome::Delivered => RecipientStatus::Completed,
        AttemptOutcome::Exhausted => RecipientStatus::Failed,
    };

    let mut new_state: State = state.clone();
    let subject: String = order_subject(order);
    if let Some(slot) = new_state
        .orders
        .iter_mut()
        .find(|o| o.order_id == Some(order_id))
    {
        slot.recipients[index].status = new_recipient_status;
        slot.status = derive_order_status(&slot.recipients);
        if slot.status == OrderStatus::Completed {
            slot.completed_at = Some(attempted_at);
        }
    }

    let details: String = format!(
        "Recorded {} attempt on recipient {recipient_id} of order {order_id}",
        outcome.as_str()
    );
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "RecordDeliveryAttempt",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn apply_cancel_order(
    state: &State,
    order_id: i64,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let Some(order) = state.order_by_id(order_id) else {
        return Err(CoreError::NotFound {
            resource: format!("order {order_id}"),
        });
    };
    if order.status.is_terminal() {
        return Err(CoreError::Conflict {
            reason: format!("order is already {}", order.status),
        });
    }

    let mut new_state: State = state.clone();
    let subject: String = order_subject(order);
    let mut rejected_bids: usize = 0;
    for bid in &mut new_state.bids {
        if bid.order_id == order_id && bid.status == BidStatus::Pending {
            bid.status = BidStatus::Rejected;
            rejected_bids += 1;
        }
    }
    if let Some(slot) = new_state
        .orders
        .iter_mut()
        .find(|o| o.order_id == Some(order_id))
    {
        slot.status = OrderStatus::Cancelled;
    }

    let details: String = if rejected_bids == 0 {
        format!("Cancelled order {order_id}")
    } else {
        format!("Cancelled order {order_id}; rejected {rejected_bids} pending bid(s)")
    };
    let audit_event: AuditEvent = build_event(
        state,
        &new_state,
        actor,
        cause,
        "CancelOrder",
        details,
        subject,
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}
