//! Axum HTTP handlers for the web server
//!
//! Carrier lookups answer straight from the shared directory; response
//! storage goes through the `ResponseStore` held in `AppState`.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::http::params::{self, CheckParams};
use crate::response_log::ResponseEntry;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub message: &'static str,
    pub entry: ResponseEntry,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn root() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " is running")
}

pub async fn check_carrier(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body = params::body_object(&body);
    let CheckParams {
        mc_number,
        dot_number,
    } = CheckParams::resolve(&body, &query);

    let check = state
        .directory
        .check(mc_number.as_deref(), dot_number.as_deref())?;
    debug!(
        mc_number = ?mc_number,
        dot_number = ?dot_number,
        status = ?check.status,
        "carrier checked"
    );

    Ok(Json(check).into_response())
}

pub async fn list_carriers(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let filter = params::carrier_filter(&query);
    Json(state.directory.filter(&filter)).into_response()
}

pub async fn carrier_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let carrier = state
        .directory
        .find_by_id(&id)
        .ok_or_else(carrier_not_found)?;
    Ok(Json(carrier).into_response())
}

pub async fn carrier_by_dot(
    State(state): State<AppState>,
    Path(dot_number): Path<String>,
) -> Result<Response, AppError> {
    let carrier = state
        .directory
        .find_by_dot(&dot_number)
        .ok_or_else(carrier_not_found)?;
    Ok(Json(carrier).into_response())
}

pub async fn carrier_by_mc(
    State(state): State<AppState>,
    Path(mc_number): Path<String>,
) -> Result<Response, AppError> {
    let carrier = state
        .directory
        .find_by_mc(&mc_number)
        .ok_or_else(carrier_not_found)?;
    Ok(Json(carrier).into_response())
}

pub async fn store_response(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StoreResponse>, AppError> {
    let body = params::body_object(&body);
    let payload = params::response_payload(&body)
        .ok_or_else(|| AppError::bad_request("missing_response", "Missing response data"))?;

    let draft = params::response_draft(payload).enrich(&state.directory);
    let entry = state.responses.append(draft).await?;
    info!(
        carrier_mc = ?entry.carrier_mc,
        enriched = entry.carrier_status.is_some(),
        "response stored"
    );

    Ok(Json(StoreResponse {
        message: "Data stored successfully",
        entry,
    }))
}

pub async fn list_responses(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let entries = state.responses.read_all().await?;
    Ok(Json(entries))
}

fn carrier_not_found() -> AppError {
    AppError::not_found("carrier_not_found", "Carrier not found")
}
