//! Strings allocated by the foreign routine and owned by the bridge until released.

use std::ffi::{c_void, CStr};
use std::fmt;
use std::os::raw::c_char;
use std::ptr::NonNull;

/// Frees one pointer previously returned by the foreign routine.
pub type ReleaseFn = unsafe extern "C" fn(ptr: *mut c_void);

/// Release through the C allocator, which is what a cgo `C.CString` uses.
pub unsafe extern "C" fn release_with_free(ptr: *mut c_void) {
    libc::free(ptr.cast());
}

/// A NUL-terminated string the bridge must hand back exactly once.
///
/// The release runs on drop, so every exit path (including early returns on a
/// failed host allocation) gives the memory back.
pub struct ForeignString {
    ptr: NonNull<c_char>,
    release: ReleaseFn,
}

impl ForeignString {
    /// Take ownership of `ptr`. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point to a NUL-terminated string that nobody else
    /// will free, allocated so that `release` is the matching deallocator.
    pub unsafe fn from_raw(ptr: *mut c_char, release: ReleaseFn) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, release })
    }

    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: guaranteed by `from_raw`; the string lives until `drop`.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Bytes up to, not including, the terminator.
    pub fn to_bytes(&self) -> &[u8] {
        self.as_c_str().to_bytes()
    }

    /// Bytes before the terminator.
    pub fn len(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ForeignString {
    fn drop(&mut self) {
        unsafe { (self.release)(self.ptr.as_ptr().cast()) }
    }
}

impl fmt::Debug for ForeignString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ForeignString").field(&self.as_c_str()).finish()
    }
}
