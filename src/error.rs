//! Error taxonomy shared by the rider handlers and the trip workflow.
//!
//! Every failure a caller can observe is one of the [`AppError`] variants, and
//! each variant maps to exactly one HTTP status. Store and gateway errors are
//! converted here so handlers can use `?` throughout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::riders::repo::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<&'static str>,
    },

    #[error("Rider not found")]
    RiderNotFound,

    #[error("Trip not found")]
    TripNotFound,

    #[error("You are not allowed to cancel this trip. Not the trip owner.")]
    Forbidden,

    #[error("Trip can only be cancelled when it's in REQUESTED state")]
    InvalidState { current_status: String },

    #[error("Email already registered")]
    DuplicateEmail,

    /// The Trip Service refused the call or could not be reached. `detail` is
    /// the remote body when one was returned, otherwise the transport message.
    #[error("{context}")]
    Upstream { context: &'static str, detail: Value },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>, fields: Vec<&'static str>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            AppError::RiderNotFound | AppError::TripNotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::Upstream { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        match self {
            AppError::Validation { fields, .. } => body["fields"] = json!(fields),
            AppError::InvalidState { current_status } => {
                body["current_status"] = json!(current_status)
            }
            AppError::Upstream { detail, .. } => body["message"] = detail,
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::RiderNotFound,
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::Database(e) => {
                error!(error = %e, "rider store failure");
                AppError::Internal("Database error".into())
            }
        }
    }
}
