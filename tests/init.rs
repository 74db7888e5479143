//! Config-driven registration. Runs in its own process because it sets
//! `KANA_BRIDGE_*` variables and fills the process-wide registry.

mod common;

use std::env;
use std::ffi::CStr;
use std::os::raw::c_char;

use common::{blank_init, MysqlCall};
use kana_bridge::api::ffi::kana_bridge_init;
use kana_bridge::api::mysql::{udf_convert_kana_init, MYSQL_ERRMSG_SIZE};
use kana_bridge::common::config::{CONVERT_SYMBOL_KEY, LIBRARY_KEY, RELEASE_SYMBOL_KEY};
use kana_bridge::{registered, BridgeCode};
use pretty_assertions::assert_eq;

#[test]
fn configured_library_is_loaded_on_first_use() {
    env::set_var(LIBRARY_KEY, "/nonexistent/libkana_fixture.so");

    // MySQL has no load hook, so preparing a statement loads the library.
    let mut init = blank_init();
    let mut message = [0 as c_char; MYSQL_ERRMSG_SIZE];
    let mut prepare = MysqlCall::new(None, None);
    let mut args = prepare.udf_args();
    assert!(unsafe { udf_convert_kana_init(&mut init, &mut args, message.as_mut_ptr()) });
    let reason = unsafe { CStr::from_ptr(message.as_ptr()) }.to_string_lossy().into_owned();
    assert!(reason.contains("libkana_fixture"), "{reason}");
    assert!(registered().is_err());

    assert_eq!(kana_bridge_init(), BridgeCode::Internal as u32);

    if cfg!(all(target_os = "linux", target_env = "gnu")) {
        // Symbols are resolved, never called.
        env::set_var(LIBRARY_KEY, "libc.so.6");
        env::set_var(CONVERT_SYMBOL_KEY, "getenv");
        env::set_var(RELEASE_SYMBOL_KEY, "free");
        assert_eq!(kana_bridge_init(), BridgeCode::Ok as u32);
        assert!(registered().is_ok());
        assert_eq!(kana_bridge_init(), BridgeCode::AlreadyRegistered as u32);
    }
}
