//! Host arena supplied by C glue as a table of callbacks.
//!
//! The PostgreSQL glue (`glue/postgres/kana_bridge_pg.c`) wires both callbacks
//! to `palloc_extended(.., MCXT_ALLOC_NO_OOM)`. Callbacks must return instead of
//! raising: an `ereport` longjmp across Rust frames is not allowed, so the glue
//! raises only after `kana_bridge_convert` has returned its status.

use std::os::raw::c_void;
use std::ptr::{self, NonNull};

use super::domain::Host;
use crate::common::error::{BridgeError, BridgeResult};

/// Callback table passed by the host on every call.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HostCallbacks {
    /// Opaque host state handed back to every callback.
    pub ctx: *mut c_void,

    /// Allocate `len` bytes in the current call context.
    ///
    /// # Returns
    /// - Pointer to the allocation, or null when memory is exhausted
    pub alloc: unsafe extern "C" fn(ctx: *mut c_void, len: usize) -> *mut u8,

    /// Build a native text value of exactly `len` bytes copied from `data`.
    ///
    /// # Returns
    /// - Host handle of the new value, or null when memory is exhausted
    pub new_text: unsafe extern "C" fn(ctx: *mut c_void, data: *const u8, len: usize) -> *mut c_void,
}

/// [`Host`] implementation over a borrowed [`HostCallbacks`] table.
pub struct CallbackHost<'a> {
    callbacks: &'a HostCallbacks,
}

impl<'a> CallbackHost<'a> {
    pub fn new(callbacks: &'a HostCallbacks) -> Self {
        Self { callbacks }
    }
}

impl Host for CallbackHost<'_> {
    type Text<'h> = NonNull<c_void> where Self: 'h;

    fn alloc(&self, len: usize) -> BridgeResult<&mut [u8]> {
        // Some allocators return null for zero-sized requests; ask for one byte.
        let raw = unsafe { (self.callbacks.alloc)(self.callbacks.ctx, len.max(1)) };
        if raw.is_null() {
            return Err(BridgeError::allocation(len));
        }
        // SAFETY: the host returned a fresh allocation of at least `len` bytes that
        // stays valid until its call context is reset, which outlives `self`.
        unsafe {
            ptr::write_bytes(raw, 0, len);
            Ok(std::slice::from_raw_parts_mut(raw, len))
        }
    }

    fn new_text(&self, bytes: &[u8]) -> BridgeResult<NonNull<c_void>> {
        let handle = unsafe { (self.callbacks.new_text)(self.callbacks.ctx, bytes.as_ptr(), bytes.len()) };
        NonNull::new(handle).ok_or_else(|| BridgeError::allocation(bytes.len()))
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;

    use super::*;

    unsafe extern "C" fn bump_alloc(ctx: *mut c_void, len: usize) -> *mut u8 {
        let bump = &*(ctx as *const Bump);
        bump.alloc_slice_fill_copy(len, 0xAAu8).as_mut_ptr()
    }

    unsafe extern "C" fn bump_text(ctx: *mut c_void, data: *const u8, len: usize) -> *mut c_void {
        let bump = &*(ctx as *const Bump);
        let bytes = std::slice::from_raw_parts(data, len);
        let text: &mut Vec<u8> = bump.alloc(bytes.to_vec());
        (text as *mut Vec<u8>).cast()
    }

    unsafe extern "C" fn refuse_alloc(_ctx: *mut c_void, _len: usize) -> *mut u8 {
        ptr::null_mut()
    }

    unsafe extern "C" fn refuse_text(_ctx: *mut c_void, _data: *const u8, _len: usize) -> *mut c_void {
        ptr::null_mut()
    }

    #[test]
    fn alloc_zeroes_host_memory() {
        let bump = Bump::new();
        let table = HostCallbacks {
            ctx: &bump as *const Bump as *mut c_void,
            alloc: bump_alloc,
            new_text: bump_text,
        };
        let host = CallbackHost::new(&table);
        assert_eq!(host.alloc(3).unwrap(), &[0u8; 3]);
        assert!(host.alloc(0).unwrap().is_empty());
    }

    #[test]
    fn text_handle_comes_from_host() {
        let bump = Bump::new();
        let table = HostCallbacks {
            ctx: &bump as *const Bump as *mut c_void,
            alloc: bump_alloc,
            new_text: bump_text,
        };
        let host = CallbackHost::new(&table);
        let handle = host.new_text(b"kana").unwrap();
        let text = unsafe { &*(handle.as_ptr() as *const Vec<u8>) };
        assert_eq!(text.as_slice(), b"kana");
    }

    #[test]
    fn null_from_host_is_allocation_failure() {
        let table = HostCallbacks {
            ctx: ptr::null_mut(),
            alloc: refuse_alloc,
            new_text: refuse_text,
        };
        let host = CallbackHost::new(&table);
        assert!(matches!(host.alloc(5), Err(BridgeError::Allocation { requested: 5 })));
        assert!(matches!(host.new_text(b"x"), Err(BridgeError::Allocation { requested: 1 })));
    }
}
