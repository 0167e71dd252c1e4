use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    extractors::{ValidJson, ValidPath},
    riders::{
        dto::{RiderListResponse, RiderMutationResponse, RiderRequest, RiderResponse},
        repo_types::RiderId,
        services::validate_rider,
    },
    state::AppState,
};

pub fn rider_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/riders", get(list_riders).post(create_rider))
        .route(
            "/v1/riders/:rider_id",
            get(get_rider).put(update_rider).delete(delete_rider),
        )
}

#[instrument(skip(state))]
pub async fn list_riders(
    State(state): State<AppState>,
) -> Result<Json<RiderListResponse>, AppError> {
    let data = state.riders.list().await?;
    Ok(Json(RiderListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

#[instrument(skip(state))]
pub async fn get_rider(
    State(state): State<AppState>,
    ValidPath(rider_id): ValidPath<RiderId>,
) -> Result<Json<RiderResponse>, AppError> {
    let data = state.riders.get(rider_id).await?;
    Ok(Json(RiderResponse {
        success: true,
        data,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_rider(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RiderRequest>,
) -> Result<(StatusCode, Json<RiderMutationResponse>), AppError> {
    let new_rider = validate_rider(payload)?;

    let rider = state.riders.create(&new_rider).await.map_err(|e| {
        warn!(email = %new_rider.email, error = %e, "create rider rejected");
        AppError::from(e)
    })?;

    info!(rider_id = rider.rider_id, email = %rider.email, "rider created");
    Ok((
        StatusCode::CREATED,
        Json(RiderMutationResponse {
            success: true,
            message: "Rider created successfully",
            data: Some(rider),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_rider(
    State(state): State<AppState>,
    ValidPath(rider_id): ValidPath<RiderId>,
    ValidJson(payload): ValidJson<RiderRequest>,
) -> Result<Json<RiderMutationResponse>, AppError> {
    let changes = validate_rider(payload)?;
    let rider = state.riders.update(rider_id, &changes).await?;

    info!(rider_id, "rider updated");
    Ok(Json(RiderMutationResponse {
        success: true,
        message: "Rider updated successfully",
        data: Some(rider),
    }))
}

#[instrument(skip(state))]
pub async fn delete_rider(
    State(state): State<AppState>,
    ValidPath(rider_id): ValidPath<RiderId>,
) -> Result<Json<RiderMutationResponse>, AppError> {
    state.riders.delete(rider_id).await?;

    info!(rider_id, "rider deleted");
    Ok(Json(RiderMutationResponse {
        success: true,
        message: "Rider deleted successfully",
        data: None,
    }))
}
