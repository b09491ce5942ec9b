use serde::{Deserialize, Serialize};

/// Optional `?uid=` selector on get and delete
#[derive(Debug, Default, Deserialize)]
pub struct UidParams {
    pub uid: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}
