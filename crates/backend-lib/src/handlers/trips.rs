// ============================
// crates/backend-lib/src/handlers/trips.rs
// ============================
//! One-shot HTTP handlers: login, trip creation, trip join.
//!
//! Thin glue between JSON bodies and the store. Nothing is validated;
//! whatever the client sends is stored as-is, and a store failure surfaces
//! as an opaque 500 through [`AppError`].

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::{NewTrip, Store};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub trip_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Routes for the one-shot HTTP surface.
pub fn router<S: Store + Send + Sync + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/login", post(login))
        .route("/trips/create", post(create_trip))
        .route("/trips/join", post(join_trip))
}

/// Log a user in by email, creating the row on first sight.
///
/// Idempotent per email: repeat logins return the stored id and insert
/// nothing, whatever name they carry.
async fn login<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<IdResponse>, AppError> {
    let id = match state.store.find_user_by_email(&req.email).await? {
        Some(user) => user.id,
        None => state.store.insert_user(&req.email, &req.name).await?,
    };

    Ok(Json(IdResponse { id }))
}

/// Create a trip row. The stored name is always the placeholder; only the
/// route and dates come from the request.
async fn create_trip<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(new_trip): Json<NewTrip>,
) -> Result<Json<IdResponse>, AppError> {
    let id = state.store.insert_trip(new_trip).await?;
    Ok(Json(IdResponse { id }))
}

/// Report whether a trip exists. No membership is recorded; joining is
/// purely a client-side affair after this check.
async fn join_trip<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<ExistsResponse>, AppError> {
    let exists = state.store.trip_exists(req.trip_id).await?;
    Ok(Json(ExistsResponse { exists }))
}
