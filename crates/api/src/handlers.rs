// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every mutating handler follows the same shape: load the tenant's
//! state, authorize the actor, translate the request into a core
//! command, apply it, persist the transition, and translate any error
//! into the API taxonomy. State is loaded fresh under the caller's write
//! lock, so the core's commit-time checks settle concurrent races.

use std::str::FromStr;
use time::OffsetDateTime;
use tracing::info;

use proserve::{AttemptOutcome, Command, Editability, State, can_edit};
use proserve_audit::Cause;
use proserve_domain::{
    Assignment, AssignmentMode, Order, OrderPatch, OrderStatus, PriceBreakdown, PriceStatus,
    Recipient, RecipientPatch, ServiceOptions, compute_price, order_totals, price_change,
    totals_for,
};
use proserve_persistence::{OrderSort, PersistReceipt, SqlitePersistence};

use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::collaborators::{CityInfo, DocumentStore, GeographyService, StateInfo, StoredDocument};
use crate::deadline_policy::DeadlinePolicy;
use crate::error::{
    ApiError, translate_core_error, translate_persistence_error,
};
use crate::order_number::{MAX_ATTEMPTS, generate_order_number};
use crate::request_response::{
    AcceptBidResponse, BidInfo, CancelOrderRequest, CancelOrderResponse,
    ConfirmAssignmentRequest, ConfirmAssignmentResponse, CreateDraftRequest, CreateDraftResponse,
    DiscardDraftResponse, ListBidsRequest, ListBidsResponse, ListOrdersRequest,
    ListOrdersResponse, OrderEditabilityResponse, OrderInfo, OrderTotalsInfo,
    PriceBreakdownInfo, PriceChangeInfo, PricePreviewRequest, PricePreviewResponse,
    RecipientInfo, RecipientInput, RecipientPatchInput, RecipientPriceInfo,
    RecordDeliveryAttemptRequest, RecordDeliveryAttemptResponse, RejectBidResponse,
    SubmitBidRequest, SubmitBidResponse, SubmitOrderRequest, SubmitOrderResponse,
    UpdateDraftRequest, UpdateDraftResponse, UpdateOrderRequest, UpdateOrderResponse,
};

fn load_tenant_state(
    persistence: &SqlitePersistence,
    actor: &AuthenticatedActor,
) -> Result<State, ApiError> {
    persistence
        .load_state(actor.tenant_id)
        .map_err(translate_persistence_error)
}

fn order_not_found(order_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Order"),
        message: format!("Order {order_id} does not exist"),
    }
}

fn draft_not_found(draft_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Draft"),
        message: format!("Draft {draft_id} does not exist"),
    }
}

fn recipient_not_found(order_id: i64, recipient_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Recipient"),
        message: format!("Recipient {recipient_id} does not exist on order {order_id}"),
    }
}

fn missing_id(what: &str) -> ApiError {
    ApiError::Internal {
        message: format!("persisted {what} is missing its canonical id"),
    }
}

/// Translates one recipient input into a domain recipient.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown assignment mode or guided-only
/// fields supplied in automated mode.
fn recipient_from_input(input: &RecipientInput) -> Result<Recipient, ApiError> {
    let mode: AssignmentMode = AssignmentMode::parse(&input.assignment_mode)
        .map_err(crate::error::translate_domain_error)?;

    let assignment: Assignment = match mode {
        AssignmentMode::Automated => {
            if input.assigned_server_id.is_some() {
                return Err(ApiError::InvalidInput {
                    field: String::from("assigned_server_id"),
                    message: String::from("server selection requires guided mode"),
                });
            }
            if input.quoted_price.is_some() || input.negotiated_price.is_some() {
                return Err(ApiError::InvalidInput {
                    field: String::from("quoted_price"),
                    message: String::from("server-set prices require guided mode"),
                });
            }
            Assignment::new_automated()
        }
        AssignmentMode::Guided => Assignment::Guided {
            assigned_server_id: input.assigned_server_id,
            quoted_price: input.quoted_price,
            negotiated_price: input.negotiated_price,
        },
    };

    let price_status: PriceStatus = if input.negotiated_price.is_some() {
        PriceStatus::Negotiating
    } else if input.quoted_price.is_some() {
        PriceStatus::Quoted
    } else {
        PriceStatus::Unset
    };

    let mut recipient: Recipient = Recipient::new(input.client_ref.clone());
    recipient.name.clone_from(&input.name);
    recipient.street_address.clone_from(&input.street_address);
    recipient.city.clone_from(&input.city);
    recipient.state_code.clone_from(&input.state_code);
    recipient.zip_code.clone_from(&input.zip_code);
    recipient.service = ServiceOptions {
        process_service: input.process_service,
        certified_mail: input.certified_mail,
        rush_service: input.rush_service,
        remote_location: input.remote_location,
    };
    recipient.assignment = assignment;
    recipient.price_status = price_status;
    Ok(recipient)
}

#[allow(clippy::too_many_arguments)]
fn draft_order_from_parts(
    actor: &AuthenticatedActor,
    case_number: String,
    jurisdiction: String,
    document_type: String,
    deadline: OffsetDateTime,
    special_instructions: Option<String>,
    recipients: &[RecipientInput],
    created_at: OffsetDateTime,
) -> Result<Order, ApiError> {
    let mut order: Order = Order::new_draft(
        actor.tenant_id,
        actor.subject_id,
        case_number,
        jurisdiction,
        document_type,
        deadline,
        special_instructions,
        created_at,
    );
    order.recipients = recipients
        .iter()
        .map(recipient_from_input)
        .collect::<Result<Vec<Recipient>, ApiError>>()?;
    Ok(order)
}

fn breakdown_info(breakdown: &PriceBreakdown) -> PriceBreakdownInfo {
    PriceBreakdownInfo {
        base: breakdown.base,
        add_ons: breakdown.add_ons,
        due_now: breakdown.due_now,
        pending_base: breakdown.pending_base,
    }
}

fn recipient_info(recipient: &Recipient) -> Result<RecipientInfo, ApiError> {
    let Some(recipient_id) = recipient.recipient_id else {
        return Err(missing_id("recipient"));
    };
    Ok(RecipientInfo {
        recipient_id,
        client_ref: recipient.client_ref.clone(),
        name: recipient.name.clone(),
        street_address: recipient.street_address.clone(),
        city: recipient.city.clone(),
        state_code: recipient.state_code.clone(),
        zip_code: recipient.zip_code.clone(),
        process_service: recipient.service.process_service,
        certified_mail: recipient.service.certified_mail,
        rush_service: recipient.service.rush_service,
        remote_location: recipient.service.remote_location,
        assignment_mode: recipient.assignment.mode().as_str().to_string(),
        assigned_server_id: recipient.assignment.assigned_server_id(),
        price_status: recipient.price_status.as_str().to_string(),
        final_agreed_price: recipient.final_agreed_price,
        status: recipient.status.as_str().to_string(),
        price: breakdown_info(&compute_price(recipient)),
    })
}

fn totals_info(order: &Order) -> OrderTotalsInfo {
    let totals = order_totals(order);
    OrderTotalsInfo {
        subtotal: totals.subtotal,
        processing_fee: totals.processing_fee,
        total: totals.total,
        has_pending_base: totals.has_pending_base,
    }
}

fn order_info(order: &Order) -> Result<OrderInfo, ApiError> {
    let Some(order_id) = order.order_id else {
        return Err(missing_id("order"));
    };
    let Some(order_number) = order.order_number.clone() else {
        return Err(missing_id("order number"));
    };
    Ok(OrderInfo {
        order_id,
        order_number,
        customer_id: order.customer_id,
        case_number: order.case_number.clone(),
        jurisdiction: order.jurisdiction.clone(),
        document_type: order.document_type.clone(),
        deadline: order.deadline,
        special_instructions: order.special_instructions.clone(),
        status: order.status.as_str().to_string(),
        recipients: order
            .recipients
            .iter()
            .map(recipient_info)
            .collect::<Result<Vec<RecipientInfo>, ApiError>>()?,
        created_at: order.created_at,
        completed_at: order.completed_at,
        totals: totals_info(order),
    })
}

/// Creates a draft for the acting customer.
///
/// # Errors
///
/// Returns an error if the actor may not create drafts or the request
/// carries invalid recipient input.
pub fn create_draft(
    persistence: &mut SqlitePersistence,
    request: CreateDraftRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CreateDraftResponse, ApiError> {
    AuthorizationService::authorize_create_draft(actor)?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let order: Order = draft_order_from_parts(
        actor,
        request.case_number,
        request.jurisdiction,
        request.document_type,
        request.deadline,
        request.special_instructions,
        &request.recipients,
        now,
    )?;

    let state: State = load_tenant_state(persistence, actor)?;
    let transition = proserve::apply(
        &state,
        Command::CreateDraft {
            customer_id: actor.subject_id,
            order,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    let receipt: PersistReceipt = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let Some(draft_id) = receipt.draft_id else {
        return Err(missing_id("draft"));
    };
    info!(draft_id, customer_id = actor.subject_id, "Created draft");

    Ok(CreateDraftResponse {
        draft_id,
        edit_seq: 0,
        message: format!("Draft {draft_id} created"),
    })
}

/// Applies an autosave payload to a draft.
///
/// Saves are idempotent per (draft, sequence): a stale or duplicate
/// payload is acknowledged with `applied: false` and leaves the stored
/// draft untouched.
///
/// # Errors
///
/// Returns an error if the draft does not exist or the actor may not
/// manage it.
pub fn update_draft(
    persistence: &mut SqlitePersistence,
    request: UpdateDraftRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UpdateDraftResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(draft) = state.draft_by_id(request.draft_id) else {
        return Err(draft_not_found(request.draft_id));
    };
    AuthorizationService::authorize_manage_draft(
        actor,
        "update_draft",
        draft.order.customer_id,
    )?;

    let applied: bool = draft.accepts_edit_seq(request.edit_seq);
    let payload: Order = draft_order_from_parts(
        actor,
        request.case_number,
        request.jurisdiction,
        request.document_type,
        request.deadline,
        request.special_instructions,
        &request.recipients,
        draft.order.created_at,
    )?;

    let transition = proserve::apply(
        &state,
        Command::SaveDraft {
            draft_id: request.draft_id,
            edit_seq: request.edit_seq,
            order: payload,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let stored = persistence
        .draft_by_id(request.draft_id)
        .map_err(translate_persistence_error)?;

    Ok(UpdateDraftResponse {
        draft_id: request.draft_id,
        edit_seq: stored.edit_seq,
        applied,
        message: if applied {
            format!("Draft {} saved at sequence {}", request.draft_id, request.edit_seq)
        } else {
            format!(
                "Draft {} already at sequence {}; stale save ignored",
                request.draft_id, stored.edit_seq
            )
        },
    })
}

/// Discards a draft without submitting it.
///
/// # Errors
///
/// Returns an error if the draft does not exist or the actor may not
/// manage it.
pub fn discard_draft(
    persistence: &mut SqlitePersistence,
    draft_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DiscardDraftResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(draft) = state.draft_by_id(draft_id) else {
        return Err(draft_not_found(draft_id));
    };
    AuthorizationService::authorize_manage_draft(actor, "discard_draft", draft.order.customer_id)?;

    let transition = proserve::apply(
        &state,
        Command::DiscardDraft { draft_id },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    Ok(DiscardDraftResponse {
        draft_id,
        message: format!("Draft {draft_id} discarded"),
    })
}

/// Submits a draft, promoting it to an open order.
///
/// The order number is generated and assigned at this instant, never
/// before; the draft is consumed on success.
///
/// # Errors
///
/// Returns an error if the draft is invalid for submission, the
/// deadline violates policy, or the actor may not manage the draft.
pub fn submit_order(
    persistence: &mut SqlitePersistence,
    request: SubmitOrderRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SubmitOrderResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(draft) = state.draft_by_id(request.draft_id) else {
        return Err(draft_not_found(request.draft_id));
    };
    AuthorizationService::authorize_manage_draft(actor, "submit_order", draft.order.customer_id)?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    DeadlinePolicy::default().validate(draft.order.deadline, now)?;

    let mut order_number: Option<String> = None;
    for _ in 0..MAX_ATTEMPTS {
        let candidate: String = generate_order_number(now.year());
        if !persistence
            .order_number_exists(&candidate)
            .map_err(translate_persistence_error)?
        {
            order_number = Some(candidate);
            break;
        }
    }
    let Some(order_number) = order_number else {
        return Err(ApiError::Internal {
            message: String::from("could not allocate a unique order number"),
        });
    };

    let transition = proserve::apply(
        &state,
        Command::SubmitOrder {
            draft_id: request.draft_id,
            order_number: order_number.clone(),
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    let receipt: PersistReceipt = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let Some(order_id) = receipt.order_id else {
        return Err(missing_id("order"));
    };
    let order: Order = persistence
        .order_by_id(order_id)
        .map_err(translate_persistence_error)?;
    info!(order_id, %order_number, "Submitted order");

    Ok(SubmitOrderResponse {
        order_id,
        order_number,
        status: order.status.as_str().to_string(),
        totals: totals_info(&order),
        message: format!("Order {order_id} submitted"),
    })
}

/// Reads one order.
///
/// # Errors
///
/// Returns an error if the order does not exist in the actor's tenant.
pub fn get_order(
    persistence: &SqlitePersistence,
    order_id: i64,
    actor: &AuthenticatedActor,
) -> Result<OrderInfo, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(order) = state.order_by_id(order_id) else {
        return Err(order_not_found(order_id));
    };
    order_info(order)
}

/// Reports whether an order may currently be edited.
///
/// # Errors
///
/// Returns an error if the order does not exist in the actor's tenant.
pub fn get_order_editability(
    persistence: &SqlitePersistence,
    order_id: i64,
    actor: &AuthenticatedActor,
) -> Result<OrderEditabilityResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(order) = state.order_by_id(order_id) else {
        return Err(order_not_found(order_id));
    };
    let editability: Editability = can_edit(order);
    Ok(OrderEditabilityResponse {
        order_id,
        can_edit: editability.allowed,
        lock_reason: editability.lock_reason,
    })
}

fn service_patch(recipient: &Recipient, input: &RecipientPatchInput) -> Option<ServiceOptions> {
    if input.process_service.is_none()
        && input.certified_mail.is_none()
        && input.rush_service.is_none()
        && input.remote_location.is_none()
    {
        return None;
    }
    Some(ServiceOptions {
        process_service: input
            .process_service
            .unwrap_or(recipient.service.process_service),
        certified_mail: input
            .certified_mail
            .unwrap_or(recipient.service.certified_mail),
        rush_service: input.rush_service.unwrap_or(recipient.service.rush_service),
        remote_location: input
            .remote_location
            .unwrap_or(recipient.service.remote_location),
    })
}

fn recipient_patch_from_input(
    order: &Order,
    input: &RecipientPatchInput,
) -> Result<RecipientPatch, ApiError> {
    let Some(recipient) = order.recipient_by_id(input.recipient_id) else {
        return Err(recipient_not_found(
            order.order_id.unwrap_or_default(),
            input.recipient_id,
        ));
    };

    let assignment_mode: Option<AssignmentMode> = input
        .assignment_mode
        .as_deref()
        .map(AssignmentMode::parse)
        .transpose()
        .map_err(crate::error::translate_domain_error)?;

    Ok(RecipientPatch {
        recipient_id: Some(input.recipient_id),
        name: input.name.clone(),
        street_address: input.street_address.clone(),
        city: input.city.clone(),
        state_code: input.state_code.clone(),
        zip_code: input.zip_code.clone(),
        service: service_patch(recipient, input),
        assignment_mode,
        assigned_server_id: input.assigned_server_id,
        quoted_price: input.quoted_price,
        negotiated_price: input.negotiated_price,
    })
}

/// Applies a partial update to a submitted order.
///
/// The whole patch validates or nothing applies. The response reports
/// each patched recipient's price change the way the user should see
/// it: a fee delta while the base is pending, full totals otherwise.
///
/// # Errors
///
/// Returns an error if the order is locked, any patch element is
/// invalid, or the actor lacks authority over the order.
pub fn update_order(
    persistence: &mut SqlitePersistence,
    request: UpdateOrderRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UpdateOrderResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(order) = state.order_by_id(request.order_id) else {
        return Err(order_not_found(request.order_id));
    };
    AuthorizationService::authorize_modify_order(actor, "update_order", order.customer_id)?;

    let mut recipient_patches: Vec<RecipientPatch> = Vec::new();
    let mut before: Vec<(i64, Recipient)> = Vec::new();
    for input in &request.recipients {
        let patch: RecipientPatch = recipient_patch_from_input(order, input)?;
        if let Some(recipient) = order.recipient_by_id(input.recipient_id) {
            before.push((input.recipient_id, recipient.clone()));
        }
        recipient_patches.push(patch);
    }

    let patch: OrderPatch = OrderPatch {
        case_number: request.case_number,
        jurisdiction: request.jurisdiction,
        document_type: request.document_type,
        deadline: request.deadline,
        special_instructions: request.special_instructions,
        recipients: recipient_patches,
    };

    let transition = proserve::apply(
        &state,
        Command::UpdateOrder {
            order_id: request.order_id,
            patch,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let updated: Order = persistence
        .order_by_id(request.order_id)
        .map_err(translate_persistence_error)?;

    let mut price_changes: Vec<PriceChangeInfo> = Vec::new();
    for (recipient_id, previous) in &before {
        if let Some(current) = updated.recipient_by_id(*recipient_id) {
            price_changes.push(PriceChangeInfo {
                recipient_id: *recipient_id,
                change: price_change(previous, current),
            });
        }
    }

    Ok(UpdateOrderResponse {
        order: order_info(&updated)?,
        price_changes,
        message: format!("Order {} updated", request.order_id),
    })
}

fn parse_sort(sort: Option<&str>) -> Result<OrderSort, ApiError> {
    match sort {
        None | Some("created_desc") => Ok(OrderSort::CreatedAtDesc),
        Some("created_asc") => Ok(OrderSort::CreatedAtAsc),
        Some("deadline_asc") => Ok(OrderSort::DeadlineAsc),
        Some("deadline_desc") => Ok(OrderSort::DeadlineDesc),
        Some(other) => Err(ApiError::InvalidInput {
            field: String::from("sort"),
            message: format!("unknown sort '{other}'"),
        }),
    }
}

/// Lists orders with an explicit status filter and sort.
///
/// Customers see their own orders; admins and process servers see the
/// tenant's.
///
/// # Errors
///
/// Returns an error for an unknown status or sort value.
pub fn list_orders(
    persistence: &SqlitePersistence,
    request: &ListOrdersRequest,
    actor: &AuthenticatedActor,
) -> Result<ListOrdersResponse, ApiError> {
    let status: Option<OrderStatus> = request
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()
        .map_err(crate::error::translate_domain_error)?;
    let sort: OrderSort = parse_sort(request.sort.as_deref())?;

    let mut orders: Vec<Order> = persistence
        .list_orders(actor.tenant_id, status, sort)
        .map_err(translate_persistence_error)?;
    if actor.role == Role::Customer {
        orders.retain(|o| o.customer_id == actor.subject_id);
    }

    Ok(ListOrdersResponse {
        orders: orders
            .iter()
            .map(order_info)
            .collect::<Result<Vec<OrderInfo>, ApiError>>()?,
    })
}

/// Prices a set of recipients without persisting anything.
///
/// This is the same engine the server uses to validate submitted
/// totals, so the preview can never diverge from the authoritative
/// computation.
///
/// # Errors
///
/// Returns an error for invalid recipient input.
pub fn price_preview(request: &PricePreviewRequest) -> Result<PricePreviewResponse, ApiError> {
    let recipients: Vec<Recipient> = request
        .recipients
        .iter()
        .map(recipient_from_input)
        .collect::<Result<Vec<Recipient>, ApiError>>()?;

    let totals = totals_for(&recipients);
    Ok(PricePreviewResponse {
        recipients: recipients
            .iter()
            .map(|r| RecipientPriceInfo {
                client_ref: r.client_ref.clone(),
                price: breakdown_info(&compute_price(r)),
            })
            .collect(),
        totals: OrderTotalsInfo {
            subtotal: totals.subtotal,
            processing_fee: totals.processing_fee,
            total: totals.total,
            has_pending_base: totals.has_pending_base,
        },
    })
}

/// Submits a bid on an automated recipient.
///
/// # Errors
///
/// Returns an error if the actor is not a process server, the target is
/// not open for bidding, or the server already has a pending bid.
pub fn submit_bid(
    persistence: &mut SqlitePersistence,
    request: SubmitBidRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SubmitBidResponse, ApiError> {
    AuthorizationService::authorize_submit_bid(actor)?;

    let state: State = load_tenant_state(persistence, actor)?;
    if state.order_by_id(request.order_id).is_none() {
        return Err(order_not_found(request.order_id));
    }

    let transition = proserve::apply(
        &state,
        Command::SubmitBid {
            order_id: request.order_id,
            recipient_id: request.recipient_id,
            process_server_id: actor.subject_id,
            amount: request.amount,
            comment: request.comment,
            submitted_at: OffsetDateTime::now_utc(),
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    let receipt: PersistReceipt = persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let Some(bid_id) = receipt.bid_id else {
        return Err(missing_id("bid"));
    };
    info!(
        bid_id,
        order_id = request.order_id,
        process_server_id = actor.subject_id,
        "Submitted bid"
    );

    Ok(SubmitBidResponse {
        bid_id,
        order_id: request.order_id,
        recipient_id: request.recipient_id,
        status: String::from("pending"),
        message: format!("Bid {bid_id} submitted"),
    })
}

/// Lists the bids on an order.
///
/// Process servers see only their own bids; customers and admins see
/// all of them.
///
/// # Errors
///
/// Returns an error if the order does not exist in the actor's tenant.
pub fn list_bids(
    persistence: &SqlitePersistence,
    request: &ListBidsRequest,
    actor: &AuthenticatedActor,
) -> Result<ListBidsResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    if state.order_by_id(request.order_id).is_none() {
        return Err(order_not_found(request.order_id));
    }

    let mut bids: Vec<BidInfo> = Vec::new();
    for bid in state.bids.iter().filter(|b| b.order_id == request.order_id) {
        if actor.role == Role::ProcessServer && bid.process_server_id != actor.subject_id {
            continue;
        }
        let Some(bid_id) = bid.bid_id else {
            return Err(missing_id("bid"));
        };
        bids.push(BidInfo {
            bid_id,
            order_id: bid.order_id,
            recipient_id: bid.recipient_id,
            process_server_id: bid.process_server_id,
            amount: bid.amount,
            comment: bid.comment.clone(),
            status: bid.status.as_str().to_string(),
            created_at: bid.created_at,
        });
    }

    Ok(ListBidsResponse { bids })
}

/// Accepts a pending bid, binding the bidder and price to the
/// recipient and implicitly rejecting every other pending bid on it.
///
/// # Errors
///
/// Returns an error if the bid is unknown, no longer pending, the
/// recipient already lost a race, or the actor lacks authority.
pub fn accept_bid(
    persistence: &mut SqlitePersistence,
    bid_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<AcceptBidResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(bid) = state.bid_by_id(bid_id) else {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Bid"),
            message: format!("Bid {bid_id} does not exist"),
        });
    };
    let Some(order) = state.order_by_id(bid.order_id) else {
        return Err(order_not_found(bid.order_id));
    };
    AuthorizationService::authorize_decide_bid(actor, "accept_bid", order.customer_id)?;

    let recipient_id: i64 = bid.recipient_id;
    let rejected_bid_ids: Vec<i64> = state
        .bids_for_recipient(recipient_id)
        .iter()
        .filter(|b| b.bid_id != Some(bid_id) && b.status == proserve_domain::BidStatus::Pending)
        .filter_map(|b| b.bid_id)
        .collect();

    let transition = proserve::apply(
        &state,
        Command::AcceptBid { bid_id },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let updated: Order = persistence
        .order_by_id(bid.order_id)
        .map_err(translate_persistence_error)?;
    let Some(recipient) = updated.recipient_by_id(recipient_id) else {
        return Err(recipient_not_found(bid.order_id, recipient_id));
    };
    info!(bid_id, recipient_id, "Accepted bid");

    Ok(AcceptBidResponse {
        order: order_info(&updated)?,
        recipient: recipient_info(recipient)?,
        rejected_bid_ids,
        message: format!("Bid {bid_id} accepted"),
    })
}

/// Rejects a pending bid. No other side effects.
///
/// # Errors
///
/// Returns an error if the bid is unknown, no longer pending, or the
/// actor lacks authority.
pub fn reject_bid(
    persistence: &mut SqlitePersistence,
    bid_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RejectBidResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(bid) = state.bid_by_id(bid_id) else {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Bid"),
            message: format!("Bid {bid_id} does not exist"),
        });
    };
    let Some(order) = state.order_by_id(bid.order_id) else {
        return Err(order_not_found(bid.order_id));
    };
    AuthorizationService::authorize_decide_bid(actor, "reject_bid", order.customer_id)?;

    let transition = proserve::apply(
        &state,
        Command::RejectBid { bid_id },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    Ok(RejectBidResponse {
        bid_id,
        message: format!("Bid {bid_id} rejected"),
    })
}

/// Confirms the selected server on a guided recipient, binding it and
/// resolving its price.
///
/// # Errors
///
/// Returns an error if the recipient is not a confirmable guided
/// recipient or the actor lacks authority.
pub fn confirm_assignment(
    persistence: &mut SqlitePersistence,
    request: ConfirmAssignmentRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ConfirmAssignmentResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(order) = state.order_by_id(request.order_id) else {
        return Err(order_not_found(request.order_id));
    };
    let Some(recipient) = order.recipient_by_id(request.recipient_id) else {
        return Err(recipient_not_found(request.order_id, request.recipient_id));
    };
    let selected: Option<i64> = match recipient.assignment {
        Assignment::Guided {
            assigned_server_id, ..
        } => assigned_server_id,
        Assignment::Automated { .. } => None,
    };
    AuthorizationService::authorize_confirm_assignment(actor, selected)?;

    let transition = proserve::apply(
        &state,
        Command::ConfirmAssignment {
            order_id: request.order_id,
            recipient_id: request.recipient_id,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let updated: Order = persistence
        .order_by_id(request.order_id)
        .map_err(translate_persistence_error)?;
    let Some(confirmed) = updated.recipient_by_id(request.recipient_id) else {
        return Err(recipient_not_found(request.order_id, request.recipient_id));
    };

    Ok(ConfirmAssignmentResponse {
        order: order_info(&updated)?,
        recipient: recipient_info(confirmed)?,
        message: format!(
            "Assignment confirmed for recipient {}",
            request.recipient_id
        ),
    })
}

/// Records a delivery attempt outcome reported by the delivery
/// subsystem.
///
/// # Errors
///
/// Returns an error for an unknown outcome, an unassigned recipient, or
/// an actor without authority over the recipient.
pub fn record_delivery_attempt(
    persistence: &mut SqlitePersistence,
    request: RecordDeliveryAttemptRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RecordDeliveryAttemptResponse, ApiError> {
    let outcome: AttemptOutcome = match request.outcome.as_str() {
        "attempted" => AttemptOutcome::Attempted,
        "delivered" => AttemptOutcome::Delivered,
        "exhausted" => AttemptOutcome::Exhausted,
        other => {
            return Err(ApiError::InvalidInput {
                field: String::from("outcome"),
                message: format!("unknown outcome '{other}'"),
            });
        }
    };

    let state: State = load_tenant_state(persistence, actor)?;
    let Some(order) = state.order_by_id(request.order_id) else {
        return Err(order_not_found(request.order_id));
    };
    let Some(recipient) = order.recipient_by_id(request.recipient_id) else {
        return Err(recipient_not_found(request.order_id, request.recipient_id));
    };
    AuthorizationService::authorize_record_attempt(
        actor,
        recipient.assignment.assigned_server_id(),
    )?;

    let transition = proserve::apply(
        &state,
        Command::RecordDeliveryAttempt {
            order_id: request.order_id,
            recipient_id: request.recipient_id,
            outcome,
            attempted_at: OffsetDateTime::now_utc(),
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;

    let updated: Order = persistence
        .order_by_id(request.order_id)
        .map_err(translate_persistence_error)?;

    Ok(RecordDeliveryAttemptResponse {
        order: order_info(&updated)?,
        message: format!(
            "Recorded {} attempt on recipient {}",
            request.outcome, request.recipient_id
        ),
    })
}

/// Cancels an order. Pending bids are rejected; no further mutation is
/// permitted afterwards.
///
/// # Errors
///
/// Returns an error if the order is already terminal or the actor lacks
/// authority.
pub fn cancel_order(
    persistence: &mut SqlitePersistence,
    request: CancelOrderRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CancelOrderResponse, ApiError> {
    let state: State = load_tenant_state(persistence, actor)?;
    let Some(order) = state.order_by_id(request.order_id) else {
        return Err(order_not_found(request.order_id));
    };
    AuthorizationService::authorize_modify_order(actor, "cancel_order", order.customer_id)?;

    let transition = proserve::apply(
        &state,
        Command::CancelOrder {
            order_id: request.order_id,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;
    persistence
        .persist_transition(&transition)
        .map_err(translate_persistence_error)?;
    info!(order_id = request.order_id, "Cancelled order");

    Ok(CancelOrderResponse {
        order_id: request.order_id,
        status: OrderStatus::Cancelled.as_str().to_string(),
        message: format!("Order {} cancelled", request.order_id),
    })
}

/// Returns the list of known states from the geography collaborator.
///
/// # Errors
///
/// Returns an error if the collaborator fails.
pub fn states_list(geography: &dyn GeographyService) -> Result<Vec<StateInfo>, ApiError> {
    geography.states_list().map_err(ApiError::from)
}

/// Returns the cities of a state from the geography collaborator.
///
/// # Errors
///
/// Returns an error if the collaborator fails.
pub fn cities_by_state(
    geography: &dyn GeographyService,
    state_id: i64,
) -> Result<Vec<CityInfo>, ApiError> {
    geography.cities_by_state(state_id).map_err(ApiError::from)
}

/// Stores a document via the document store collaborator.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn upload_document(
    store: &dyn DocumentStore,
    actor: &AuthenticatedActor,
    file_name: &str,
    content: &[u8],
) -> Result<StoredDocument, ApiError> {
    store
        .upload_document(actor.subject_id, file_name, content)
        .map_err(ApiError::from)
}
