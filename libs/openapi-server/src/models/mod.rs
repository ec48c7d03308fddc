//! Navis API models

use serde::{Deserialize, Serialize};

/// Response to a webhook delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookResponse {
    pub status: u16,
    pub detail: String,
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub active_workers: usize,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}
