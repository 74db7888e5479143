//! Conversion invoker.

use tracing::trace;

use super::marshal::NullTerminatedBuffer;
use crate::common::error::BridgeResult;
use crate::foreign::{ForeignResult, ForeignRoutine};

/// Call `routine` on the marshaled buffers and take ownership of what it
/// returns. No interpretation beyond rebuilding the tagged result.
pub fn invoke(
    routine: &dyn ForeignRoutine,
    text: &NullTerminatedBuffer<'_>,
    mode: &NullTerminatedBuffer<'_>,
) -> BridgeResult<ForeignResult> {
    // SAFETY: both buffers are NUL-terminated arena memory borrowed for the whole
    // call, and the raw return is consumed exactly once right here.
    let result = unsafe {
        let raw = routine.call(text.as_ptr(), mode.as_ptr());
        ForeignResult::from_raw(raw, routine.release())
    }?;
    trace!(success = result.is_success(), "foreign routine returned");
    Ok(result)
}
