//! MySQL loadable-function entry points for `convert_kana(text, mode)`.
//!
//! MySQL hands over arguments as pointer + length pairs, so they go through
//! the same marshaling as any other host. The result lives in a per-statement
//! arena that is reset on every row and dropped in `deinit`.
//!
//! MySQL has no module load hook, so the first `*_init` loads the routine named
//! by `KANA_BRIDGE_LIBRARY` unless one was registered already. None of these
//! entry points lets a panic unwind into the server.

use std::ffi::c_void;
use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong};
use std::ptr;

use tracing::warn;

use super::ffi::{registered, registered_or_init, shielded};
use crate::bridge::{convert_kana, CallError};
use crate::common::config::BridgeCfg;
use crate::common::log;
use crate::host::{ArenaHost, TextArgument};

/// `Item_result::STRING_RESULT` from `mysql/udf_registration_types.h`.
pub const STRING_RESULT: c_int = 0;
/// Size of the `message` buffer handed to `*_init`.
pub const MYSQL_ERRMSG_SIZE: usize = 512;
/// Advertised upper bound of the result length.
pub const MAX_RESULT_LENGTH: c_ulong = 65_535;

/// Mirror of `UDF_INIT`.
#[repr(C)]
pub struct UdfInit {
    pub maybe_null: bool,
    pub decimals: c_uint,
    pub max_length: c_ulong,
    pub ptr: *mut c_char,
    pub const_item: bool,
    pub extension: *mut c_void,
}

/// Mirror of `UDF_ARGS`.
#[repr(C)]
pub struct UdfArgs {
    pub arg_count: c_uint,
    pub arg_type: *mut c_int,
    pub args: *mut *mut c_char,
    pub lengths: *mut c_ulong,
    pub maybe_null: *mut c_char,
    pub attributes: *mut *mut c_char,
    pub attribute_lengths: *mut c_ulong,
    pub extension: *mut c_void,
}

impl UdfArgs {
    /// Argument `idx` as a span, or `None` for SQL NULL.
    ///
    /// # Safety
    ///
    /// `idx < arg_count` and the arrays must be the ones MySQL passed in.
    unsafe fn span(&self, idx: usize) -> Option<TextArgument<'_>> {
        let data = *self.args.add(idx);
        if data.is_null() {
            return None;
        }
        let len = *self.lengths.add(idx) as usize;
        TextArgument::from_raw_parts(data as *const u8, len)
    }

    /// # Safety
    ///
    /// `arg_type` must hold `arg_count` entries.
    unsafe fn types(&self) -> &[c_int] {
        if self.arg_type.is_null() {
            return &[];
        }
        std::slice::from_raw_parts(self.arg_type, self.arg_count as usize)
    }
}

/// Per-statement state hung off `UDF_INIT::ptr`.
struct UdfState {
    arena: ArenaHost,
}

/// # Safety
///
/// Called by MySQL with valid `initid`, `args` and a `MYSQL_ERRMSG_SIZE` buffer.
#[no_mangle]
pub unsafe extern "C" fn udf_convert_kana_init(initid: *mut UdfInit, args: *mut UdfArgs, message: *mut c_char) -> bool {
    let prepared = shielded("udf_convert_kana_init", Err(PANIC_MESSAGE.to_vec()), || prepare(&*args));
    match prepared {
        Ok(state) => {
            let initid = &mut *initid;
            initid.maybe_null = true;
            initid.max_length = MAX_RESULT_LENGTH;
            initid.ptr = Box::into_raw(Box::new(state)).cast();
            false
        }
        Err(reason) => {
            write_message(message, &reason);
            true
        }
    }
}

/// # Safety
///
/// Called by MySQL once per row after a successful `udf_convert_kana_init`.
#[no_mangle]
pub unsafe extern "C" fn udf_convert_kana(
    initid: *mut UdfInit,
    args: *mut UdfArgs,
    _result: *mut c_char,
    length: *mut c_ulong,
    is_null: *mut c_uchar,
    error: *mut c_uchar,
) -> *mut c_char {
    match shielded("udf_convert_kana", Row::Failed, || convert_row(&*initid, &*args)) {
        Row::Value(bytes) => {
            *length = bytes.len() as c_ulong;
            bytes.as_ptr() as *mut c_char
        }
        Row::Null => {
            *is_null = 1;
            ptr::null_mut()
        }
        Row::Failed => {
            *error = 1;
            ptr::null_mut()
        }
    }
}

/// # Safety
///
/// Called by MySQL once after the statement finished.
#[no_mangle]
pub unsafe extern "C" fn udf_convert_kana_deinit(initid: *mut UdfInit) {
    shielded("udf_convert_kana_deinit", (), || {
        let initid = &mut *initid;
        if !initid.ptr.is_null() {
            drop(Box::from_raw(initid.ptr as *mut UdfState));
            initid.ptr = ptr::null_mut();
        }
    })
}

/// Message used when preparation panicked.
const PANIC_MESSAGE: &[u8] = b"internal error in convert_kana";

/// Outcome of one row. `Value` borrows the statement arena.
enum Row<'s> {
    Value(&'s [u8]),
    Null,
    Failed,
}

unsafe fn convert_row<'s>(initid: &'s UdfInit, args: &UdfArgs) -> Row<'s> {
    let (text, mode) = match (args.span(0), args.span(1)) {
        (Some(text), Some(mode)) => (text, mode),
        _ => return Row::Null,
    };

    let state = &mut *(initid.ptr as *mut UdfState);
    state.arena.reset();

    let routine = match registered() {
        Ok(routine) => routine,
        Err(err) => {
            warn!(%err, "udf_convert_kana called without a routine");
            return Row::Failed;
        }
    };

    match convert_kana(&state.arena, routine, text, mode) {
        Ok(converted) => Row::Value(converted.as_bytes()),
        Err(err) => {
            warn!(code = ?err.code(), %err, "udf_convert_kana failed");
            Row::Failed
        }
    }
}

/// Validate the call shape, make sure a routine is loaded, and, when the mode
/// is a constant, let the routine reject it before the first row.
unsafe fn prepare(args: &UdfArgs) -> Result<UdfState, Vec<u8>> {
    check_shape(args)?;
    let cfg = BridgeCfg::load().map_err(|err| err.to_string().into_bytes())?;
    log::init(&cfg);
    prepare_with(args, &cfg)
}

unsafe fn check_shape(args: &UdfArgs) -> Result<(), Vec<u8>> {
    if args.arg_count != 2 {
        return Err(b"2 arguments expected".to_vec());
    }
    if args.types().iter().any(|&kind| kind != STRING_RESULT) {
        return Err(b"2 arguments must be string".to_vec());
    }
    Ok(())
}

unsafe fn prepare_with(args: &UdfArgs, cfg: &BridgeCfg) -> Result<UdfState, Vec<u8>> {
    let routine = registered_or_init(cfg).map_err(|err| err.to_string().into_bytes())?;
    let state = UdfState {
        arena: ArenaHost::with_limit(cfg.arena_limit),
    };

    if let Some(mode) = args.span(1) {
        match convert_kana(&state.arena, routine, TextArgument::from(""), mode) {
            Ok(_) => {}
            Err(CallError::Conversion(message)) => return Err(message.as_bytes().to_vec()),
            Err(err) => return Err(err.to_string().into_bytes()),
        }
    }
    Ok(state)
}

/// Copy `reason` into MySQL's message buffer, truncated to fit without
/// splitting a UTF-8 sequence. Other bytes are copied as they are.
unsafe fn write_message(message: *mut c_char, reason: &[u8]) {
    if message.is_null() {
        return;
    }
    let mut len = reason.len().min(MYSQL_ERRMSG_SIZE - 1);
    while len > 0 && len < reason.len() && reason[len] & 0xC0 == 0x80 {
        len -= 1;
    }
    ptr::copy_nonoverlapping(reason.as_ptr(), message.cast::<u8>(), len);
    *message.add(len) = 0;
}
