//! Bag catalog endpoints
//!
//! Thin adapters between axum extractors and [`BagService`](crate::service::BagService).
//! Extractor rejections (non-numeric id, malformed JSON) are reported as
//! validation errors so every client error has the same body shape.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{ApiError, ApiResult};
use crate::models::{BagInput, BagResponse, DeleteConfirmation};
use crate::AppState;

/// GET /bags
pub async fn list_bags(State(state): State<AppState>) -> ApiResult<Json<Vec<BagResponse>>> {
    Ok(Json(state.bags.list().await?))
}

/// GET /bags/:id
pub async fn get_bag(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<BagResponse>> {
    let id = bag_id(id)?;
    Ok(Json(state.bags.get(id).await?))
}

/// POST /bags
///
/// Responds 201 with the stored bag as re-read after the insert.
pub async fn create_bag(
    State(state): State<AppState>,
    body: Result<Json<BagInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BagResponse>)> {
    let input = bag_body(body)?;
    let created = state.bags.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /bags/:id
pub async fn update_bag(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<BagInput>, JsonRejection>,
) -> ApiResult<Json<BagResponse>> {
    let id = bag_id(id)?;
    let input = bag_body(body)?;
    Ok(Json(state.bags.update(id, input).await?))
}

/// DELETE /bags/:id
pub async fn delete_bag(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<DeleteConfirmation>> {
    let id = bag_id(id)?;
    Ok(Json(state.bags.delete(id).await?))
}

fn bag_id(id: Result<Path<u64>, PathRejection>) -> ApiResult<u64> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::validation("id", rejection.body_text()))
}

fn bag_body(body: Result<Json<BagInput>, JsonRejection>) -> ApiResult<BagInput> {
    body.map(|Json(input)| input)
        .map_err(|rejection| ApiError::validation("body", rejection.body_text()))
}

/// Build bag catalog routes
pub fn bag_routes() -> Router<AppState> {
    Router::new()
        .route("/bags", get(list_bags).post(create_bag))
        .route("/bags/:id", get(get_bag).put(update_bag).delete(delete_bag))
}
