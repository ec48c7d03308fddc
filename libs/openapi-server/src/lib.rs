//! Navis server API models

pub mod models;
