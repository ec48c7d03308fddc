//! HTTP server: webhook intake and artifact serving

pub mod handlers;
pub mod serve;
pub mod signature;
pub mod state;
