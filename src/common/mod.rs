//! Shared utilities that glue the bridge layers together.
pub mod config;
pub mod error;
pub mod log;

pub use error::{BridgeCode, BridgeError, BridgeResult};
