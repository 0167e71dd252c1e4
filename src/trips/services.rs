//! Rider-initiated trip operations delegated to the Trip Service.
//!
//! Cancellation is a guarded remote transition: the trip is read from the
//! Trip Service, then ownership is checked, then state, and only then is the
//! cancel call issued. Ownership is checked first so a non-owner learns
//! nothing about the trip's lifecycle. The state can still change between the
//! read and the cancel call; the Trip Service is responsible for rejecting the
//! transition at that point and the result is not re-verified here.

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::{
    error::AppError,
    riders::{repo::RiderStore, repo_types::RiderId},
    trips::{
        dto::{CreateTripRequest, NewTrip, TripStatus},
        gateway::{is_addressable_trip_id, GatewayError, TripGateway},
    },
};

pub const CANCEL_REASON: &str = "Cancelled by rider";

fn validate_trip_request(rider_id: RiderId, req: CreateTripRequest) -> Result<NewTrip, AppError> {
    let pickup_zone = req
        .pickup_zone
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let drop_zone = req
        .drop_zone
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let distance_km = req.distance_km.filter(|d| d.is_finite() && *d > 0.0);

    let mut invalid = Vec::new();
    if pickup_zone.is_none() {
        invalid.push("pickup_zone");
    }
    if drop_zone.is_none() {
        invalid.push("drop_zone");
    }
    if distance_km.is_none() {
        invalid.push("distance_km");
    }

    match (pickup_zone, drop_zone, distance_km) {
        (Some(pickup_zone), Some(drop_zone), Some(distance_km)) => Ok(NewTrip {
            rider_id,
            pickup_zone,
            drop_zone,
            distance_km,
        }),
        _ => Err(AppError::validation("Missing or invalid fields", invalid)),
    }
}

/// Validates the request, checks the rider exists locally, then asks the Trip
/// Service to create the trip. Nothing is persisted here; the created trip is
/// returned exactly as the Trip Service sent it.
#[instrument(skip(riders, trips, req))]
pub async fn create_trip_for_rider(
    riders: &dyn RiderStore,
    trips: &dyn TripGateway,
    rider_id: RiderId,
    req: CreateTripRequest,
) -> Result<Value, AppError> {
    let new_trip = validate_trip_request(rider_id, req)?;

    riders.get(rider_id).await?;

    let created = trips.create_trip(&new_trip).await.map_err(|e| {
        error!(error = %e, rider_id, "trip service create failed");
        AppError::Upstream {
            context: "Failed to create trip",
            detail: e.detail(),
        }
    })?;

    info!(rider_id, "trip created via trip service");
    Ok(created)
}

#[instrument(skip(trips))]
pub async fn cancel_trip_for_rider(
    trips: &dyn TripGateway,
    rider_id: RiderId,
    trip_id: &str,
) -> Result<Value, AppError> {
    if !is_addressable_trip_id(trip_id) {
        warn!(rider_id, trip_id, "cancel rejected: unusable trip id");
        return Err(AppError::validation("Invalid trip id", vec!["trip_id"]));
    }

    let upstream = |e: GatewayError| {
        error!(error = %e, rider_id, trip_id, "trip service cancel flow failed");
        AppError::Upstream {
            context: "Failed to cancel trip",
            detail: e.detail(),
        }
    };

    let trip = match trips.fetch_trip(trip_id).await {
        Ok(trip) => trip,
        Err(GatewayError::NotFound) => return Err(AppError::TripNotFound),
        Err(e) => return Err(upstream(e)),
    };

    if !trip.is_owned_by(rider_id) {
        warn!(rider_id, trip_id, "cancel rejected: not the trip owner");
        return Err(AppError::Forbidden);
    }

    if trip.status != TripStatus::Requested {
        warn!(rider_id, trip_id, status = trip.status.as_str(), "cancel rejected: trip not REQUESTED");
        return Err(AppError::InvalidState {
            current_status: trip.status.as_str().to_string(),
        });
    }

    let cancelled = trips
        .cancel_trip(trip_id, CANCEL_REASON)
        .await
        .map_err(upstream)?;

    info!(rider_id, trip_id, "trip cancelled via trip service");
    Ok(cancelled)
}
