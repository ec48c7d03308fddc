//! Deployment module

pub mod artifacts;
pub mod context;
pub mod executor;
pub mod fsm;
pub mod ident;
pub mod output;
pub mod registry;
pub mod reporter;
pub mod script;
pub mod status;
