//! The seam between the bridge and whatever implements the conversion.

use std::os::raw::c_char;

use super::domain::{ConvertFn, ForeignReturn};
use super::owned::{release_with_free, ReleaseFn};

/// An externally implemented conversion routine.
///
/// Implementations are called concurrently from independent calls and must
/// not share mutable state between them.
pub trait ForeignRoutine: Send + Sync {
    /// Run one conversion.
    ///
    /// # Safety
    ///
    /// `input` and `mode` must point to NUL-terminated buffers that stay valid
    /// and unmodified until the call returns.
    unsafe fn call(&self, input: *const c_char, mode: *const c_char) -> ForeignReturn;

    /// Deallocator matching the strings returned by [`ForeignRoutine::call`].
    fn release(&self) -> ReleaseFn;
}

/// Routine given directly as function pointers, e.g. by host glue that links
/// the converter statically.
#[derive(Clone, Copy, Debug)]
pub struct FnRoutine {
    convert: ConvertFn,
    release: ReleaseFn,
}

impl FnRoutine {
    /// Routine whose results are freed with `free(3)`.
    pub fn new(convert: ConvertFn) -> Self {
        Self::with_release(convert, release_with_free)
    }

    pub fn with_release(convert: ConvertFn, release: ReleaseFn) -> Self {
        Self { convert, release }
    }
}

impl ForeignRoutine for FnRoutine {
    unsafe fn call(&self, input: *const c_char, mode: *const c_char) -> ForeignReturn {
        (self.convert)(input, mode)
    }

    fn release(&self) -> ReleaseFn {
        self.release
    }
}
