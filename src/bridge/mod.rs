//! The call-boundary bridge between the host and the foreign converter.
//!
//! Marshaler -> Invoker -> Translator. Host memory is never freed here; every
//! foreign string is released exactly once before a call returns.

pub mod domain;
pub mod invoke;
pub mod marshal;
pub mod service;
pub mod translate;

pub use domain::{CallError, CallResult};
pub use marshal::NullTerminatedBuffer;
pub use service::convert_kana;
