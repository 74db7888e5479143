//! Result translator: foreign result to host value or host error.

use super::domain::{CallError, CallResult};
use crate::foreign::ForeignResult;
use crate::host::{Host, HostMessage};

/// Consume `result`, copying the meaningful string into host memory.
///
/// The foreign string is released when it goes out of scope at the end of its
/// branch, after the copy, including when the host allocation fails.
pub fn translate<H: Host>(host: &H, result: ForeignResult) -> CallResult<'_, H::Text<'_>> {
    match result {
        ForeignResult::Failure(error) => {
            let message = HostMessage::copy_in(host, error.to_bytes())?;
            drop(error);
            Err(CallError::Conversion(message))
        }
        ForeignResult::Success(value) => {
            let text = host.new_text(value.to_bytes())?;
            drop(value);
            Ok(text)
        }
    }
}
