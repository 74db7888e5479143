//! Argument marshaling: host spans to NUL-terminated buffers in the host arena.

use std::os::raw::c_char;

use crate::common::error::BridgeResult;
use crate::host::{Host, TextArgument};

/// Copy of a [`TextArgument`] with a zero byte appended, allocated in the
/// host arena. Embedded zero bytes are kept as they are.
#[derive(Debug)]
pub struct NullTerminatedBuffer<'h> {
    bytes: &'h [u8],
}

impl<'h> NullTerminatedBuffer<'h> {
    /// All `L + 1` bytes, terminator included.
    pub fn as_bytes_with_nul(&self) -> &'h [u8] {
        self.bytes
    }

    /// The `L` copied bytes.
    pub fn content(&self) -> &'h [u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    /// Never zero: the terminator is always there.
    pub fn len_with_nul(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr().cast()
    }
}

/// Copy `arg` verbatim into a fresh arena buffer of `len + 1` bytes.
pub fn marshal<'h, H: Host>(host: &'h H, arg: TextArgument<'_>) -> BridgeResult<NullTerminatedBuffer<'h>> {
    let src = arg.as_bytes();
    let buf = host.alloc(src.len() + 1)?;
    buf[..src.len()].copy_from_slice(src);
    buf[src.len()] = 0;
    Ok(NullTerminatedBuffer { bytes: buf })
}

/// Marshal the input text and the mode selector.
pub fn marshal_pair<'h, H: Host>(
    host: &'h H,
    text: TextArgument<'_>,
    mode: TextArgument<'_>,
) -> BridgeResult<(NullTerminatedBuffer<'h>, NullTerminatedBuffer<'h>)> {
    Ok((marshal(host, text)?, marshal(host, mode)?))
}
