//! The foreign-call contract and its typed reconstruction.

use std::os::raw::c_char;

use super::owned::{ForeignString, ReleaseFn};
use crate::common::error::{BridgeError, BridgeResult};

/// Raw return of the foreign routine, laid out like the struct cgo generates
/// for a `(*C.char, *C.char)` result.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ForeignReturn {
    /// Converted text. Unspecified when `error` is non-null.
    pub value: *mut c_char,
    /// Failure message, or null on success.
    pub error: *mut c_char,
}

/// Signature of the foreign conversion routine.
pub type ConvertFn = unsafe extern "C" fn(input: *const c_char, mode: *const c_char) -> ForeignReturn;

/// Typed outcome of a foreign call. Exactly one string is owned.
#[derive(Debug)]
pub enum ForeignResult {
    Success(ForeignString),
    Failure(ForeignString),
}

impl ForeignResult {
    /// Rebuild the tagged result from the raw pair. `error` decides the branch;
    /// on failure `value` is neither read nor released.
    ///
    /// # Safety
    ///
    /// `raw` must come straight from a routine whose strings are freed by
    /// `release`, and must not be consumed twice.
    pub unsafe fn from_raw(raw: ForeignReturn, release: ReleaseFn) -> BridgeResult<Self> {
        if let Some(error) = ForeignString::from_raw(raw.error, release) {
            return Ok(ForeignResult::Failure(error));
        }
        ForeignString::from_raw(raw.value, release)
            .map(ForeignResult::Success)
            .ok_or(BridgeError::ForeignContract("routine returned neither value nor error"))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ForeignResult::Success(_))
    }
}
