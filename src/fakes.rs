//! In-memory stand-ins for the rider store and the Trip Service.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use time::OffsetDateTime;

use crate::{
    riders::{
        repo::{RiderStore, StoreError},
        repo_types::{NewRider, Rider, RiderId},
    },
    state::AppState,
    trips::{
        dto::{NewTrip, Trip, TripStatus},
        gateway::{GatewayError, TripGateway},
    },
};

#[derive(Default)]
pub struct InMemoryRiderStore {
    rows: Mutex<Vec<Rider>>,
    next_id: Mutex<RiderId>,
}

impl InMemoryRiderStore {
    pub fn with_rider(name: &str, email: &str) -> Self {
        let store = Self::default();
        let now = OffsetDateTime::now_utc();
        store.rows.lock().unwrap().push(Rider {
            rider_id: 1,
            name: name.into(),
            email: email.into(),
            phone: "+1234567890".into(),
            created_at: now,
            updated_at: now,
        });
        *store.next_id.lock().unwrap() = 1;
        store
    }

    pub fn snapshot(&self) -> Vec<Rider> {
        self.rows.lock().unwrap().clone()
    }

    fn email_taken(rows: &[Rider], email: &str, except: Option<RiderId>) -> bool {
        rows.iter()
            .any(|r| r.email == email && Some(r.rider_id) != except)
    }
}

#[async_trait]
impl RiderStore for InMemoryRiderStore {
    async fn get(&self, id: RiderId) -> Result<Rider, StoreError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.rider_id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Rider>, StoreError> {
        Ok(self.snapshot())
    }

    async fn create(&self, rider: &NewRider) -> Result<Rider, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &rider.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let created_at = rider.created_at.unwrap_or_else(OffsetDateTime::now_utc);
        let row = Rider {
            rider_id: *next_id,
            name: rider.name.clone(),
            email: rider.email.clone(),
            phone: rider.phone.clone(),
            created_at,
            updated_at: created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: RiderId, rider: &NewRider) -> Result<Rider, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &rider.email, Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }
        let row = rows
            .iter_mut()
            .find(|r| r.rider_id == id)
            .ok_or(StoreError::NotFound)?;
        row.name = rider.name.clone();
        row.email = rider.email.clone();
        row.phone = rider.phone.clone();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }

    async fn delete(&self, id: RiderId) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.rider_id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Trip Service double. Cancelling a stored trip flips it to CANCELLED, so
/// repeated calls see the new state.
#[derive(Default)]
pub struct FakeTripGateway {
    trips: Mutex<HashMap<String, Trip>>,
    fetch_error: Mutex<Option<GatewayError>>,
    create_response: Option<Value>,
    create_error: Mutex<Option<GatewayError>>,
    cancel_response: Option<Value>,
    cancel_error: Mutex<Option<GatewayError>>,
    created: Mutex<Vec<NewTrip>>,
    cancelled: Mutex<Vec<(String, String)>>,
}

impl FakeTripGateway {
    pub fn with_trip(self, trip_id: &str, rider_id: RiderId, status: &str) -> Self {
        let trip = Trip {
            trip_id: Some(json!(trip_id)),
            rider_id: json!(rider_id),
            status: TripStatus::from(status.to_string()),
            extra: Map::new(),
        };
        self.trips.lock().unwrap().insert(trip_id.to_string(), trip);
        self
    }

    pub fn with_fetch_error(self, e: GatewayError) -> Self {
        *self.fetch_error.lock().unwrap() = Some(e);
        self
    }

    pub fn with_create_response(mut self, v: Value) -> Self {
        self.create_response = Some(v);
        self
    }

    pub fn with_create_error(self, e: GatewayError) -> Self {
        *self.create_error.lock().unwrap() = Some(e);
        self
    }

    pub fn with_cancel_response(mut self, v: Value) -> Self {
        self.cancel_response = Some(v);
        self
    }

    pub fn with_cancel_error(self, e: GatewayError) -> Self {
        *self.cancel_error.lock().unwrap() = Some(e);
        self
    }

    pub fn created(&self) -> Vec<NewTrip> {
        self.created.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<(String, String)> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl TripGateway for FakeTripGateway {
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, GatewayError> {
        if let Some(e) = self.fetch_error.lock().unwrap().take() {
            return Err(e);
        }
        self.trips
            .lock()
            .unwrap()
            .get(trip_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn create_trip(&self, trip: &NewTrip) -> Result<Value, GatewayError> {
        self.created.lock().unwrap().push(trip.clone());
        if let Some(e) = self.create_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self
            .create_response
            .clone()
            .unwrap_or_else(|| json!({"trip_id": 1, "status": "REQUESTED"})))
    }

    async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<Value, GatewayError> {
        self.cancelled
            .lock()
            .unwrap()
            .push((trip_id.to_string(), reason.to_string()));
        if let Some(e) = self.cancel_error.lock().unwrap().take() {
            return Err(e);
        }
        let mut trips = self.trips.lock().unwrap();
        let trip = trips.get_mut(trip_id).ok_or(GatewayError::NotFound)?;
        trip.status = TripStatus::Cancelled;
        Ok(self
            .cancel_response
            .clone()
            .unwrap_or_else(|| serde_json::to_value(&*trip).unwrap_or(Value::Null)))
    }
}

pub fn fake_state(riders: Arc<InMemoryRiderStore>, trips: Arc<FakeTripGateway>) -> AppState {
    AppState::from_parts(riders, trips)
}
