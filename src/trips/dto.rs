use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::riders::repo_types::RiderId;

/// Lifecycle states known to the Trip Service. Anything else is kept verbatim
/// so it can be echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TripStatus {
    Requested,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl TripStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TripStatus::Requested => "REQUESTED",
            TripStatus::Accepted => "ACCEPTED",
            TripStatus::InProgress => "IN_PROGRESS",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
            TripStatus::Other(s) => s,
        }
    }
}

impl From<String> for TripStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "REQUESTED" => TripStatus::Requested,
            "ACCEPTED" => TripStatus::Accepted,
            "IN_PROGRESS" => TripStatus::InProgress,
            "COMPLETED" => TripStatus::Completed,
            "CANCELLED" => TripStatus::Cancelled,
            _ => TripStatus::Other(s),
        }
    }
}

impl From<TripStatus> for String {
    fn from(s: TripStatus) -> Self {
        s.as_str().to_string()
    }
}

/// Trip as read from the Trip Service. Only the fields the cancel guards
/// need are typed; the rest is carried in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<Value>,
    #[serde(default)]
    pub rider_id: Value, // number or numeric string, depending on the Trip Service build
    pub status: TripStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trip {
    /// Compares by numeric value, so `1`, `1.0` and `"1"` all name rider 1.
    pub fn is_owned_by(&self, rider_id: RiderId) -> bool {
        match &self.rider_id {
            Value::Number(n) => match n.as_i64() {
                Some(id) => id == rider_id,
                None => n.as_f64() == Some(rider_id as f64),
            },
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<RiderId>() {
                    Ok(id) => id == rider_id,
                    Err(_) => s.parse::<f64>().ok() == Some(rider_id as f64),
                }
            }
            _ => false,
        }
    }
}

/// Body of `POST /v1/riders/:rider_id/create-trip`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTripRequest {
    pub pickup_zone: Option<String>,
    pub drop_zone: Option<String>,
    pub distance_km: Option<f64>,
}

/// Body sent to the Trip Service to create a trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrip {
    pub rider_id: RiderId,
    pub pickup_zone: String,
    pub drop_zone: String,
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct CancelTripBody<'a> {
    pub reason: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub success: bool,
    pub message: &'static str,
    pub trip: Value,
}
