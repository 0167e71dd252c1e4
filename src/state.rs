use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::riders::repo::{PgRiderStore, RiderStore};
use crate::trips::gateway::{HttpTripGateway, TripGateway};

/// Dependencies shared by every handler. Built once at startup and cloned
/// per request.
#[derive(Clone)]
pub struct AppState {
    pub riders: Arc<dyn RiderStore>,
    pub trips: Arc<dyn TripGateway>,
}

impl AppState {
    pub fn init(config: &AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let riders = Arc::new(PgRiderStore::new(db)) as Arc<dyn RiderStore>;
        let trips = Arc::new(HttpTripGateway::new(&config.trip_service)?) as Arc<dyn TripGateway>;
        Ok(Self::from_parts(riders, trips))
    }

    pub fn from_parts(riders: Arc<dyn RiderStore>, trips: Arc<dyn TripGateway>) -> Self {
        Self { riders, trips }
    }
}
