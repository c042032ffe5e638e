// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

//! HTTP transport for the proserve API.
//!
//! This binary is a thin shim: identity arrives pre-validated from the
//! upstream auth collaborator as headers, every request maps onto one
//! API handler call, and errors translate mechanically onto status
//! codes. No business rules live here.

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use proserve_api::{
    ApiError, AuthenticatedActor, CancelOrderRequest, ConfirmAssignmentRequest,
    CreateDraftRequest, ListBidsRequest, ListOrdersRequest, PricePreviewRequest,
    RecordDeliveryAttemptRequest, Role, SubmitBidRequest, SubmitOrderRequest,
    UpdateDraftRequest, UpdateOrderRequest,
};
use proserve_audit::Cause;
use proserve_persistence::SqlitePersistence;

/// proserve server - HTTP server for the process-service order
/// coordination system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an
    /// in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// Persistence sits behind a Mutex: every mutation loads state, applies
/// a command, and commits inside one critical section, which is what
/// settles concurrent bid acceptances and edit races deterministically.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<SqlitePersistence>>,
}

#[derive(Debug, Deserialize)]
struct ListOrdersQuery {
    status: Option<String>,
    sort: Option<String>,
}

fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
        ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        ApiError::ValidationFailed { .. } | ApiError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
        ApiError::Conflict { .. } => StatusCode::CONFLICT,
        ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(err: ApiError) -> Response {
    if matches!(err, ApiError::Internal { .. }) {
        error!(%err, "Request failed");
    }
    (
        status_for(&err),
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

fn header_i64(headers: &HeaderMap, name: &str) -> Result<i64, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or_else(|| ApiError::AuthenticationFailed {
            reason: format!("missing or invalid {name} header"),
        })
}

/// Reconstructs the pre-validated identity context from headers.
///
/// The upstream auth service terminates sessions and stamps these
/// headers; this server never sees or parses tokens.
fn actor_from_headers(headers: &HeaderMap) -> Result<AuthenticatedActor, ApiError> {
    let subject_id: i64 = header_i64(headers, "x-actor-id")?;
    let tenant_id: i64 = header_i64(headers, "x-tenant-id")?;
    let role_str: &str = headers
        .get("x-actor-role")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::AuthenticationFailed {
            reason: String::from("missing x-actor-role header"),
        })?;
    let role: Role = Role::parse(role_str)?;
    Ok(AuthenticatedActor::new(subject_id, tenant_id, role))
}

fn cause_from_headers(headers: &HeaderMap) -> Cause {
    let request_id: String = headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| String::from("unattributed"), ToString::to_string);
    Cause::new(request_id, String::from("HTTP request"))
}

async fn create_draft_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateDraftRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::create_draft(&mut persistence, request, &actor, cause) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn update_draft_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(draft_id): Path<i64>,
    Json(mut request): Json<UpdateDraftRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    // The path is authoritative for which draft is saved.
    request.draft_id = draft_id;
    let mut persistence = state.persistence.lock().await;
    match proserve_api::update_draft(&mut persistence, request, &actor, cause) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn discard_draft_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(draft_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::discard_draft(&mut persistence, draft_id, &actor, cause) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn submit_order_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(draft_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::submit_order(
        &mut persistence,
        SubmitOrderRequest { draft_id },
        &actor,
        cause,
    ) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn list_orders_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListOrdersQuery>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let persistence = state.persistence.lock().await;
    let request = ListOrdersRequest {
        status: query.status,
        sort: query.sort,
    };
    match proserve_api::list_orders(&persistence, &request, &actor) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn get_order_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let persistence = state.persistence.lock().await;
    match proserve_api::get_order(&persistence, order_id, &actor) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn order_editability_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let persistence = state.persistence.lock().await;
    match proserve_api::get_order_editability(&persistence, order_id, &actor) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn update_order_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
    Json(mut request): Json<UpdateOrderRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    request.order_id = order_id;
    let mut persistence = state.persistence.lock().await;
    match proserve_api::update_order(&mut persistence, request, &actor, cause) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn cancel_order_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::cancel_order(
        &mut persistence,
        CancelOrderRequest { order_id },
        &actor,
        cause,
    ) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn list_bids_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let persistence = state.persistence.lock().await;
    match proserve_api::list_bids(&persistence, &ListBidsRequest { order_id }, &actor) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn submit_bid_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
    Json(mut request): Json<SubmitBidRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    request.order_id = order_id;
    let mut persistence = state.persistence.lock().await;
    match proserve_api::submit_bid(&mut persistence, request, &actor, cause) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn accept_bid_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(bid_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::accept_bid(&mut persistence, bid_id, &actor, cause) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn reject_bid_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path(bid_id): Path<i64>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::reject_bid(&mut persistence, bid_id, &actor, cause) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn confirm_assignment_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path((order_id, recipient_id)): Path<(i64, i64)>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    let mut persistence = state.persistence.lock().await;
    match proserve_api::confirm_assignment(
        &mut persistence,
        ConfirmAssignmentRequest {
            order_id,
            recipient_id,
        },
        &actor,
        cause,
    ) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn record_attempt_handler(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path((order_id, recipient_id)): Path<(i64, i64)>,
    Json(mut request): Json<RecordDeliveryAttemptRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return failure(err),
    };
    let cause = cause_from_headers(&headers);
    request.order_id = order_id;
    request.recipient_id = recipient_id;
    let mut persistence = state.persistence.lock().await;
    match proserve_api::record_delivery_attempt(&mut persistence, request, &actor, cause) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

async fn price_preview_handler(Json(request): Json<PricePreviewRequest>) -> Response {
    match proserve_api::price_preview(&request) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => failure(err),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/drafts", post(create_draft_handler))
        .route(
            "/drafts/{draft_id}",
            put(update_draft_handler).delete(discard_draft_handler),
        )
        .route("/drafts/{draft_id}/submit", post(submit_order_handler))
        .route("/orders", get(list_orders_handler))
        .route(
            "/orders/{order_id}",
            get(get_order_handler).patch(update_order_handler),
        )
        .route(
            "/orders/{order_id}/editability",
            get(order_editability_handler),
        )
        .route("/orders/{order_id}/cancel", post(cancel_order_handler))
        .route(
            "/orders/{order_id}/bids",
            get(list_bids_handler).post(submit_bid_handler),
        )
        .route("/bids/{bid_id}/accept", post(accept_bid_handler))
        .route("/bids/{bid_id}/reject", post(reject_bid_handler))
        .route(
            "/orders/{order_id}/recipients/{recipient_id}/confirm",
            post(confirm_assignment_handler),
        )
        .route(
            "/orders/{order_id}/recipients/{recipient_id}/attempts",
            post(record_attempt_handler),
        )
        .route("/pricing/preview", post(price_preview_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Args = Args::parse();

    let persistence: SqlitePersistence = match &args.database {
        Some(path) => {
            info!(%path, "Opening database");
            SqlitePersistence::new(path)?
        }
        None => {
            info!("Using in-memory database");
            SqlitePersistence::in_memory()?
        }
    };

    let state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    let addr: String = format!("0.0.0.0:{}", args.port);
    info!(%addr, "Starting proserve server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
