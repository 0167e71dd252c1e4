use serde::{Deserialize, Serialize};

use crate::riders::repo_types::Rider;

/// Request body for creating or replacing a rider. Fields are optional so a
/// missing one is reported as a validation error instead of a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct RiderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RiderListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Rider>,
}

#[derive(Debug, Serialize)]
pub struct RiderResponse {
    pub success: bool,
    pub data: Rider,
}

/// Response for create, update and delete.
#[derive(Debug, Serialize)]
pub struct RiderMutationResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Rider>,
}
