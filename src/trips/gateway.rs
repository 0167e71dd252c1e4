//! Client for the external Trip Service.
//!
//! A remote that answers with an error status is reported as
//! [`GatewayError::Remote`] (or [`GatewayError::NotFound`] for a 404 on read),
//! which keeps the body the remote sent. A remote that cannot be reached, times
//! out, or answers with something that is not a trip is a transport-class
//! failure. No call is ever retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    config::TripServiceConfig,
    trips::dto::{CancelTripBody, NewTrip, Trip},
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("trip not found")]
    NotFound,
    #[error("trip service responded with status {status}")]
    Remote { status: u16, payload: Value },
    #[error("trip service unreachable: {0}")]
    Transport(String),
    #[error("malformed trip service response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// What the caller sees: the remote body if there was one, otherwise the
    /// error text.
    pub fn detail(self) -> Value {
        match self {
            GatewayError::Remote { payload, .. } if !payload.is_null() => payload,
            other => Value::String(other.to_string()),
        }
    }
}

#[async_trait]
pub trait TripGateway: Send + Sync {
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, GatewayError>;
    async fn create_trip(&self, trip: &NewTrip) -> Result<Value, GatewayError>;
    async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<Value, GatewayError>;
}

#[derive(Clone)]
pub struct HttpTripGateway {
    client: Client,
    base_url: Url,
}

impl HttpTripGateway {
    pub fn new(config: &TripServiceConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(config.base_url.trim_end_matches('/'))?,
        })
    }

    /// Appends each segment percent-encoded, so an id such as `../x` or `a?b`
    /// stays inside `/v1/trips/`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Transport(format!("unusable trip service url {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn trip_endpoint(&self, trip_id: &str, suffix: Option<&str>) -> Result<Url, GatewayError> {
        // dot segments are dropped by the URL builder and would address the collection
        if !is_addressable_trip_id(trip_id) {
            return Err(GatewayError::NotFound);
        }
        let mut segments = vec!["v1", "trips", trip_id];
        segments.extend(suffix);
        self.endpoint(&segments)
    }
}

pub fn is_addressable_trip_id(trip_id: &str) -> bool {
    !matches!(trip_id.trim(), "" | "." | "..")
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

/// Reads the body once. Error statuses keep whatever the remote sent (JSON if
/// it parses, the raw text otherwise); success bodies must be JSON.
async fn read_payload(response: Response) -> Result<Value, GatewayError> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;
    debug!(%status, bytes = text.len(), "trip service response");

    if !status.is_success() {
        let payload = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        return Err(GatewayError::Remote {
            status: status.as_u16(),
            payload,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))
}

#[async_trait]
impl TripGateway for HttpTripGateway {
    #[instrument(skip(self))]
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, GatewayError> {
        let response = self
            .client
            .get(self.trip_endpoint(trip_id, None)?)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }

        match read_payload(response).await? {
            Value::Null => Err(GatewayError::NotFound),
            payload => {
                serde_json::from_value(payload).map_err(|e| GatewayError::Malformed(e.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn create_trip(&self, trip: &NewTrip) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(self.endpoint(&["v1", "trips"])?)
            .json(trip)
            .send()
            .await
            .map_err(transport)?;
        read_payload(response).await
    }

    #[instrument(skip(self))]
    async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<Value, GatewayError> {
        let response = self
            .client
            .patch(self.trip_endpoint(trip_id, Some("cancel"))?)
            .json(&CancelTripBody { reason })
            .send()
            .await
            .map_err(transport)?;
        read_payload(response).await
    }
}
