//! `bumpalo`-backed arena for hosts that run the bridge from Rust.

use std::alloc::Layout;
use std::ptr;

use bumpalo::Bump;

use super::domain::Host;
use crate::common::error::{BridgeError, BridgeResult};

/// Size of the length header in front of every [`ArenaText`].
pub const TEXT_HEADER_LEN: usize = 4;

/// Call-scoped arena. Everything allocated from it is reclaimed together by
/// [`ArenaHost::reset`] or on drop.
#[derive(Default)]
pub struct ArenaHost {
    bump: Bump,
}

impl ArenaHost {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Arena that refuses to grow beyond `limit` bytes of chunk memory.
    pub fn with_limit(limit: Option<usize>) -> Self {
        let bump = Bump::new();
        bump.set_allocation_limit(limit);
        Self { bump }
    }

    /// Reclaim every allocation at once, keeping the largest chunk for reuse.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Host for ArenaHost {
    type Text<'h> = ArenaText<'h>;

    fn alloc(&self, len: usize) -> BridgeResult<&mut [u8]> {
        let layout = Layout::array::<u8>(len).map_err(|_| BridgeError::allocation(len))?;
        let raw = self
            .bump
            .try_alloc_layout(layout)
            .map_err(|_| BridgeError::allocation(len))?
            .as_ptr();
        // SAFETY: `raw` is a fresh allocation of `len` bytes owned by the arena and
        // handed out exactly once; it is initialised before the slice is formed.
        unsafe {
            ptr::write_bytes(raw, 0, len);
            Ok(std::slice::from_raw_parts_mut(raw, len))
        }
    }

    fn new_text(&self, bytes: &[u8]) -> BridgeResult<ArenaText<'_>> {
        let total = bytes.len() + TEXT_HEADER_LEN;
        let header = u32::try_from(total).map_err(|_| BridgeError::allocation(total))?;
        let raw = self.alloc(total)?;
        raw[..TEXT_HEADER_LEN].copy_from_slice(&header.to_ne_bytes());
        raw[TEXT_HEADER_LEN..].copy_from_slice(bytes);
        Ok(ArenaText { raw })
    }
}

/// Length-prefixed text living in an [`ArenaHost`]: a native-endian `u32`
/// total size (header included) followed by the bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ArenaText<'h> {
    raw: &'h [u8],
}

impl<'h> ArenaText<'h> {
    pub fn as_bytes(&self) -> &'h [u8] {
        &self.raw[TEXT_HEADER_LEN..]
    }

    /// Payload length, header excluded.
    pub fn len(&self) -> usize {
        self.raw.len() - TEXT_HEADER_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size recorded in the header.
    pub fn declared_size(&self) -> usize {
        let mut header = [0u8; TEXT_HEADER_LEN];
        header.copy_from_slice(&self.raw[..TEXT_HEADER_LEN]);
        u32::from_ne_bytes(header) as usize
    }

    /// Header and payload, as the host stores them.
    pub fn as_raw(&self) -> &'h [u8] {
        self.raw
    }
}
