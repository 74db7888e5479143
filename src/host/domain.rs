//! What the bridge needs from the database that calls it.

use std::fmt;
use std::os::raw::c_char;

use crate::common::error::BridgeResult;

/// A text argument as the host hands it over: a span of known length, not
/// NUL-terminated, possibly containing zero bytes. Borrowed for the call only.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TextArgument<'a> {
    bytes: &'a [u8],
}

impl<'a> TextArgument<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Wrap a raw span. A null pointer reads as the empty string when
    /// `len == 0`; with any other length it is a broken span and yields `None`.
    ///
    /// # Safety
    ///
    /// Unless `len == 0`, `ptr` must be valid for reads of `len` bytes for `'a`.
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Option<Self> {
        if len == 0 {
            return Some(Self { bytes: &[] });
        }
        if ptr.is_null() {
            return None;
        }
        Some(Self {
            bytes: std::slice::from_raw_parts(ptr, len),
        })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Span length in bytes, zeros included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'a> From<&'a [u8]> for TextArgument<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a str> for TextArgument<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

/// Per-call memory provided by the host. Everything handed out lives until
/// the host reclaims its arena; the bridge never frees it.
pub trait Host {
    /// The host's native, length-prefixed text value.
    type Text<'h>
    where
        Self: 'h;

    /// Allocate `len` zeroed bytes in the call arena.
    #[allow(clippy::mut_from_ref)]
    fn alloc(&self, len: usize) -> BridgeResult<&mut [u8]>;

    /// Allocate a native text value of exactly `bytes.len()` bytes and copy
    /// `bytes` into it verbatim.
    fn new_text(&self, bytes: &[u8]) -> BridgeResult<Self::Text<'_>>;
}

/// A foreign error message after it was copied into host memory. The bytes are
/// followed by a zero byte in the same allocation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HostMessage<'h> {
    with_nul: &'h [u8],
}

impl<'h> HostMessage<'h> {
    /// Copy `message` into the arena, appending the terminator.
    pub fn copy_in<H: Host + ?Sized>(host: &'h H, message: &[u8]) -> BridgeResult<Self> {
        let buf = host.alloc(message.len() + 1)?;
        buf[..message.len()].copy_from_slice(message);
        buf[message.len()] = 0;
        Ok(Self { with_nul: buf })
    }

    /// Message bytes without the terminator.
    pub fn as_bytes(&self) -> &'h [u8] {
        &self.with_nul[..self.with_nul.len() - 1]
    }

    /// NUL-terminated pointer suitable for `errmsg("%s", ...)`.
    pub fn as_c_ptr(&self) -> *const c_char {
        self.with_nul.as_ptr().cast()
    }
}

impl fmt::Display for HostMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}
