use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

pub type RiderId = i64;

/// Rider record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rider {
    pub rider_id: RiderId,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated rider fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRider {
    pub name: String,
    pub email: String, // trimmed + lowercased
    pub phone: String,
    pub created_at: Option<OffsetDateTime>, // only set by bulk import
}
