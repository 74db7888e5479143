//! C-compatible API exposed to host glue.
//!
//! Ownership rules: argument spans belong to the host and are only read during
//! the call. Everything returned (`value`, `message`) was allocated through the
//! host's own callbacks, so the host reclaims it with its call context. Strings
//! returned by the foreign routine never leave this crate.

use std::ffi::c_void;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use once_cell::sync::OnceCell;
use tracing::{debug, error, info};

use crate::bridge::{convert_kana, CallError};
use crate::common::config::BridgeCfg;
use crate::common::error::{BridgeCode, BridgeError, BridgeResult};
use crate::common::log;
use crate::foreign::{ConvertFn, FnRoutine, ForeignRoutine, LoadedRoutine, ReleaseFn};
use crate::host::{CallbackHost, HostCallbacks, HostMessage, TextArgument};

/// ABI version to coordinate with host glue.
pub const API_VERSION: u32 = 1;

static ROUTINE: OnceCell<Box<dyn ForeignRoutine>> = OnceCell::new();

/// Install the process-wide routine. Only the first registration wins.
pub fn register(routine: Box<dyn ForeignRoutine>) -> BridgeResult<()> {
    ROUTINE.set(routine).map_err(|_| BridgeError::AlreadyRegistered)
}

/// The routine installed by [`register`].
pub fn registered() -> BridgeResult<&'static dyn ForeignRoutine> {
    ROUTINE.get().map(|routine| routine.as_ref()).ok_or(BridgeError::NotRegistered)
}

/// The installed routine, loading the one `cfg` names when nothing has been
/// registered yet. Hosts without a module load hook (MySQL) go through here.
pub fn registered_or_init(cfg: &BridgeCfg) -> BridgeResult<&'static dyn ForeignRoutine> {
    ROUTINE
        .get_or_try_init(|| {
            // SAFETY: the configured symbols are trusted to match `ConvertFn` / `ReleaseFn`.
            let routine = unsafe { LoadedRoutine::from_cfg(cfg) }?;
            info!(library = %routine.path().display(), "kana bridge initialised");
            Ok::<_, BridgeError>(Box::new(routine) as Box<dyn ForeignRoutine>)
        })
        .map(|routine| routine.as_ref())
}

/// Written by [`kana_bridge_convert`].
#[repr(C)]
#[derive(Debug)]
pub struct ConvertOutput {
    /// Host text handle on `Ok`, null otherwise.
    pub value: *mut c_void,
    /// NUL-terminated message in host memory when the call failed, if one could
    /// be allocated. Always set for `InvalidParameterValue`.
    pub message: *const c_char,
}

#[no_mangle]
pub extern "C" fn kana_bridge_api_version() -> u32 {
    API_VERSION
}

/// Register a statically linked routine. `release` may be null, in which case
/// returned strings are freed with `free(3)`.
#[no_mangle]
pub extern "C" fn kana_bridge_register(convert: Option<ConvertFn>, release: Option<ReleaseFn>) -> u32 {
    guarded("kana_bridge_register", || {
        let convert = convert.ok_or_else(|| BridgeError::Load("null conversion routine".to_string()))?;
        let routine = match release {
            Some(release) => FnRoutine::with_release(convert, release),
            None => FnRoutine::new(convert),
        };
        register(Box::new(routine))
    })
}

/// Register the routine named by the `KANA_BRIDGE_*` environment and install
/// logging. Meant to be called once from the host's module load hook.
#[no_mangle]
pub extern "C" fn kana_bridge_init() -> u32 {
    guarded("kana_bridge_init", || {
        let cfg = BridgeCfg::load()?;
        log::init(&cfg);
        if ROUTINE.get().is_some() {
            return Err(BridgeError::AlreadyRegistered);
        }
        registered_or_init(&cfg).map(|_| ())
    })
}

/// Convert `input` under `mode` with the registered routine.
///
/// # Safety
///
/// `host` and `out` must be valid. `input`/`mode` must be readable for
/// `input_len`/`mode_len` bytes (or null with a zero length). A null span with
/// a non-zero length is refused with `Internal`.
#[no_mangle]
pub unsafe extern "C" fn kana_bridge_convert(
    host: *const HostCallbacks,
    input: *const u8,
    input_len: usize,
    mode: *const u8,
    mode_len: usize,
    out: *mut ConvertOutput,
) -> u32 {
    if host.is_null() || out.is_null() {
        return BridgeCode::Internal as u32;
    }
    let out = &mut *out;
    out.value = ptr::null_mut();
    out.message = ptr::null();

    let callbacks = &*host;
    let (Some(text), Some(mode)) = (
        TextArgument::from_raw_parts(input, input_len),
        TextArgument::from_raw_parts(mode, mode_len),
    ) else {
        error!(input_len, mode_len, "kana_bridge_convert: null span with a length");
        return BridgeCode::Internal as u32;
    };

    shielded("kana_bridge_convert", BridgeCode::Internal, || convert_into(callbacks, text, mode, out)) as u32
}

/// SQLSTATE the host should raise for a status returned by this API.
#[no_mangle]
pub extern "C" fn kana_bridge_sqlstate(code: u32) -> *const c_char {
    BridgeCode::from_raw(code)
        .unwrap_or(BridgeCode::Internal)
        .sqlstate()
        .as_ptr()
}

fn convert_into(
    callbacks: &HostCallbacks,
    text: TextArgument<'_>,
    mode: TextArgument<'_>,
    out: &mut ConvertOutput,
) -> BridgeCode {
    let host = CallbackHost::new(callbacks);
    let result = registered()
        .map_err(CallError::from)
        .and_then(|routine| convert_kana(&host, routine, text, mode));

    match result {
        Ok(handle) => {
            out.value = handle.as_ptr();
            BridgeCode::Ok
        }
        Err(CallError::Conversion(message)) => {
            out.message = message.as_c_ptr();
            BridgeCode::InvalidParameterValue
        }
        Err(CallError::Bridge(err)) => {
            debug!(%err, "kana_bridge_convert failed");
            // Best effort: after an allocation failure this usually fails as well.
            if let Ok(message) = HostMessage::copy_in(&host, err.to_string().as_bytes()) {
                out.message = message.as_c_ptr();
            }
            err.code()
        }
    }
}

/// Run `f` so that a panic never unwinds into the host; it becomes `fallback`.
pub(crate) fn shielded<T, F>(entry: &'static str, fallback: T, f: F) -> T
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!(entry, "panic caught at the C boundary");
        fallback
    })
}

fn guarded<F>(entry: &'static str, f: F) -> u32
where
    F: FnOnce() -> BridgeResult<()>,
{
    shielded(entry, BridgeCode::Internal as u32, || match f() {
        Ok(()) => BridgeCode::Ok as u32,
        Err(err) => {
            error!(entry, %err, "registration failed");
            err.code() as u32
        }
    })
}
