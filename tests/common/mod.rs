//! Allocation-tracking stand-in for the foreign converter.
//!
//! Every string it hands out is recorded; `tracked_release` forgets it again and
//! counts anything it did not hand out (or already took back) as a bad release.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::ffi::{c_void, CStr};
use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::ptr;

use kana_bridge::api::mysql::{UdfArgs, UdfInit, STRING_RESULT};
use kana_bridge::foreign::{FnRoutine, ForeignReturn};

thread_local! {
    static LIVE: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
    static BAD_RELEASES: Cell<usize> = const { Cell::new(0) };
    static RELEASES: Cell<usize> = const { Cell::new(0) };
}

/// Placeholder written into the unspecified value field on failure.
pub const GARBAGE: usize = 0xdead_beef;

/// Error text of the `raw` mode.
pub const RAW_ERROR: &[u8] = b"bad \xff mode";

pub fn reset() {
    LIVE.with(|live| live.borrow_mut().clear());
    BAD_RELEASES.with(|n| n.set(0));
    RELEASES.with(|n| n.set(0));
}

pub fn live() -> usize {
    LIVE.with(|live| live.borrow().len())
}

pub fn bad_releases() -> usize {
    BAD_RELEASES.with(Cell::get)
}

pub fn releases() -> usize {
    RELEASES.with(Cell::get)
}

unsafe fn tracked_alloc(bytes: &[u8]) -> *mut c_char {
    let ptr = libc::malloc(bytes.len() + 1) as *mut u8;
    assert!(!ptr.is_null());
    ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
    *ptr.add(bytes.len()) = 0;
    LIVE.with(|live| live.borrow_mut().insert(ptr as usize));
    ptr.cast()
}

pub unsafe extern "C" fn tracked_release(ptr: *mut c_void) {
    let known = LIVE.with(|live| live.borrow_mut().remove(&(ptr as usize)));
    if known {
        RELEASES.with(|n| n.set(n.get() + 1));
        libc::free(ptr.cast());
    } else {
        BAD_RELEASES.with(|n| n.set(n.get() + 1));
    }
}

/// Katakana to hiragana, shifting U+30A1..=U+30F6 down by 0x60.
pub fn to_hiragana(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            other => other,
        })
        .collect()
}

/// Modes: `hira` converts, `echo` copies, `null` breaks the contract, `raw`
/// fails with a message that is not UTF-8, anything else fails with
/// `invalid mode` and leaves garbage in the value field.
pub unsafe extern "C" fn fake_convert(input: *const c_char, mode: *const c_char) -> ForeignReturn {
    let input = CStr::from_ptr(input).to_bytes();
    match CStr::from_ptr(mode).to_bytes() {
        b"hira" => ForeignReturn {
            value: tracked_alloc(to_hiragana(&String::from_utf8_lossy(input)).as_bytes()),
            error: ptr::null_mut(),
        },
        b"echo" => ForeignReturn {
            value: tracked_alloc(input),
            error: ptr::null_mut(),
        },
        b"null" => ForeignReturn {
            value: ptr::null_mut(),
            error: ptr::null_mut(),
        },
        b"raw" => ForeignReturn {
            value: ptr::null_mut(),
            error: tracked_alloc(RAW_ERROR),
        },
        _ => ForeignReturn {
            value: GARBAGE as *mut c_char,
            error: tracked_alloc(b"invalid mode"),
        },
    }
}

pub fn routine() -> FnRoutine {
    FnRoutine::with_release(fake_convert, tracked_release)
}

/// Argument arrays for one MySQL call; `None` is SQL NULL.
pub struct MysqlCall {
    types: Vec<c_int>,
    args: Vec<*mut c_char>,
    lengths: Vec<c_ulong>,
}

impl MysqlCall {
    pub fn new(text: Option<&'static [u8]>, mode: Option<&'static [u8]>) -> Self {
        let values = [text, mode];
        Self {
            types: vec![STRING_RESULT; 2],
            args: values
                .iter()
                .map(|v| v.map_or(ptr::null_mut(), |b| b.as_ptr() as *mut c_char))
                .collect(),
            lengths: values.iter().map(|v| v.map_or(0, |b| b.len() as c_ulong)).collect(),
        }
    }

    pub fn udf_args(&mut self) -> UdfArgs {
        UdfArgs {
            arg_count: 2 as c_uint,
            arg_type: self.types.as_mut_ptr(),
            args: self.args.as_mut_ptr(),
            lengths: self.lengths.as_mut_ptr(),
            maybe_null: ptr::null_mut(),
            attributes: ptr::null_mut(),
            attribute_lengths: ptr::null_mut(),
            extension: ptr::null_mut(),
        }
    }
}

pub fn blank_init() -> UdfInit {
    UdfInit {
        maybe_null: false,
        decimals: 0,
        max_length: 0,
        ptr: ptr::null_mut(),
        const_item: false,
        extension: ptr::null_mut(),
    }
}
