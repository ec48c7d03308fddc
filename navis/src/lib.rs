//! Navis Library
//!
//! Deployment execution and active-state synchronization for the Navis
//! deployment server.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod server;
pub mod storage;
pub mod utils;
