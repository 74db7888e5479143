//! Error handling primitives shared across the bridge.

use std::ffi::CStr;

use thiserror::Error;

/// Stable status codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BridgeCode {
    /// The call produced a value.
    Ok = 0,
    /// The foreign routine rejected its input; the message is user facing.
    InvalidParameterValue = 1,
    /// An arena allocation failed.
    OutOfMemory = 2,
    /// Contract violations, load failures and bugs.
    Internal = 3,
    /// No foreign routine has been registered yet.
    NotRegistered = 4,
    /// Registration was attempted twice.
    AlreadyRegistered = 5,
}

impl BridgeCode {
    /// SQLSTATE the host should raise for this code.
    pub fn sqlstate(self) -> &'static CStr {
        match self {
            BridgeCode::Ok => c"00000",
            BridgeCode::InvalidParameterValue => c"22023",
            BridgeCode::OutOfMemory => c"53200",
            BridgeCode::Internal | BridgeCode::NotRegistered | BridgeCode::AlreadyRegistered => {
                c"XX000"
            }
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => BridgeCode::Ok,
            1 => BridgeCode::InvalidParameterValue,
            2 => BridgeCode::OutOfMemory,
            3 => BridgeCode::Internal,
            4 => BridgeCode::NotRegistered,
            5 => BridgeCode::AlreadyRegistered,
            _ => return None,
        })
    }
}

/// Failures raised by the bridge itself, as opposed to conversion errors
/// reported by the foreign routine.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The host arena (or a host callback) returned nothing.
    #[error("out of memory: arena refused {requested} bytes")]
    Allocation { requested: usize },

    /// Neither a value nor an error came back.
    #[error("foreign routine broke its contract: {0}")]
    ForeignContract(&'static str),

    /// Library could not be opened or a symbol was missing. Carries the
    /// loader's text, which names the path or symbol.
    #[error("failed to load foreign routine: {0}")]
    Load(String),

    #[error("invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    /// A conversion was attempted before any routine was installed.
    #[error("no foreign routine registered")]
    NotRegistered,

    /// First registration wins.
    #[error("a foreign routine is already registered")]
    AlreadyRegistered,
}

/// Result alias used throughout the crate.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Status reported across the C ABI.
    pub fn code(&self) -> BridgeCode {
        match self {
            BridgeError::Allocation { .. } => BridgeCode::OutOfMemory,
            BridgeError::ForeignContract(_) | BridgeError::Load(_) | BridgeError::Config { .. } => {
                BridgeCode::Internal
            }
            BridgeError::NotRegistered => BridgeCode::NotRegistered,
            BridgeError::AlreadyRegistered => BridgeCode::AlreadyRegistered,
        }
    }

    pub fn allocation(requested: usize) -> Self {
        BridgeError::Allocation { requested }
    }

    pub fn config(key: &'static str, reason: impl Into<String>) -> Self {
        BridgeError::Config {
            key,
            reason: reason.into(),
        }
    }
}
