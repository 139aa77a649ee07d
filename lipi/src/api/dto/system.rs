use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    /// Always `running` while the process is serving requests.
    pub status: String,
    pub model: String,
    /// Endpoint name to path.
    pub endpoints: BTreeMap<String, String>,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `healthy` when an OCR backend is ready, `degraded` otherwise.
    pub status: String,
    pub model_loaded: bool,
    pub model_name: String,
    pub backend: String,
    pub version: String,
    /// RFC 3339 timestamp of the check.
    pub timestamp: String,
}
