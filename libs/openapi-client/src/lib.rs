//! GitHub deployments API models

pub mod models;
