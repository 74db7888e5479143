//! Outcome types of a bridged call.

use thiserror::Error;

use crate::common::error::{BridgeCode, BridgeError};
use crate::host::HostMessage;

/// Why a call produced no value.
#[derive(Debug, Error)]
pub enum CallError<'h> {
    /// The routine rejected the input. The message already lives in host
    /// memory and is surfaced as "invalid parameter value".
    #[error("{0}")]
    Conversion(HostMessage<'h>),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl CallError<'_> {
    pub fn code(&self) -> BridgeCode {
        match self {
            CallError::Conversion(_) => BridgeCode::InvalidParameterValue,
            CallError::Bridge(err) => err.code(),
        }
    }
}

pub type CallResult<'h, T> = Result<T, CallError<'h>>;
