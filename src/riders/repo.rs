use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::riders::repo_types::{NewRider, Rider, RiderId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rider not found")]
    NotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD access to persisted riders. Email uniqueness is enforced here and
/// reported as [`StoreError::DuplicateEmail`], never as a generic failure.
#[async_trait]
pub trait RiderStore: Send + Sync {
    async fn get(&self, id: RiderId) -> Result<Rider, StoreError>;
    async fn list(&self) -> Result<Vec<Rider>, StoreError>;
    async fn create(&self, rider: &NewRider) -> Result<Rider, StoreError>;
    async fn update(&self, id: RiderId, rider: &NewRider) -> Result<Rider, StoreError>;
    async fn delete(&self, id: RiderId) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgRiderStore {
    db: PgPool,
}

impl PgRiderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl RiderStore for PgRiderStore {
    async fn get(&self, id: RiderId) -> Result<Rider, StoreError> {
        sqlx::query_as::<_, Rider>(
            r#"
            SELECT rider_id, name, email, phone, created_at, updated_at
            FROM riders
            WHERE rider_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Rider>, StoreError> {
        let rows = sqlx::query_as::<_, Rider>(
            r#"
            SELECT rider_id, name, email, phone, created_at, updated_at
            FROM riders
            ORDER BY rider_id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, rider: &NewRider) -> Result<Rider, StoreError> {
        sqlx::query_as::<_, Rider>(
            r#"
            INSERT INTO riders (name, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, COALESCE($4, now()), COALESCE($4, now()))
            RETURNING rider_id, name, email, phone, created_at, updated_at
            "#,
        )
        .bind(&rider.name)
        .bind(&rider.email)
        .bind(&rider.phone)
        .bind(rider.created_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_err)
    }

    async fn update(&self, id: RiderId, rider: &NewRider) -> Result<Rider, StoreError> {
        sqlx::query_as::<_, Rider>(
            r#"
            UPDATE riders
            SET name = $1, email = $2, phone = $3, updated_at = now()
            WHERE rider_id = $4
            RETURNING rider_id, name, email, phone, created_at, updated_at
            "#,
        )
        .bind(&rider.name)
        .bind(&rider.email)
        .bind(&rider.phone)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_err)?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: RiderId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM riders WHERE rider_id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
