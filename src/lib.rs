//! Call-boundary bridge between a database's extensible-function mechanism
//! and an externally implemented kana converter.
pub mod api;
pub mod bridge;
pub mod common;
pub mod foreign;
pub mod host;

pub use api::ffi::{register, registered};
pub use bridge::{convert_kana, CallError, CallResult};
pub use common::{BridgeCode, BridgeError, BridgeResult};
