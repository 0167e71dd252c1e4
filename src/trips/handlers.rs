use axum::{
    extract::State,
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    extractors::{ValidJson, ValidPath},
    riders::repo_types::RiderId,
    state::AppState,
    trips::{
        dto::{CreateTripRequest, TripResponse},
        services::{cancel_trip_for_rider, create_trip_for_rider},
    },
};

pub fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/riders/:rider_id/create-trip", post(create_trip))
        .route("/v1/riders/:rider_id/cancel-trip/:trip_id", patch(cancel_trip))
}

#[instrument(skip(state, payload))]
pub async fn create_trip(
    State(state): State<AppState>,
    ValidPath(rider_id): ValidPath<RiderId>,
    ValidJson(payload): ValidJson<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripResponse>), AppError> {
    let trip =
        create_trip_for_rider(state.riders.as_ref(), state.trips.as_ref(), rider_id, payload)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(TripResponse {
            success: true,
            message: "Trip created successfully via Trip Service",
            trip,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn cancel_trip(
    State(state): State<AppState>,
    ValidPath((rider_id, trip_id)): ValidPath<(RiderId, String)>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = cancel_trip_for_rider(state.trips.as_ref(), rider_id, &trip_id).await?;
    Ok(Json(TripResponse {
        success: true,
        message: "Trip cancelled successfully",
        trip,
    }))
}
