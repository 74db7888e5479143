//! Keeps the C header and the PostgreSQL glue in step with the exported ABI.

use kana_bridge::api::ffi::API_VERSION;
use kana_bridge::BridgeCode;
use pretty_assertions::assert_eq;
use rstest::rstest;

const HEADER: &str = include_str!("../include/kana_bridge.h");
const PG_GLUE: &str = include_str!("../glue/postgres/kana_bridge_pg.c");

fn header_define(name: &str) -> Option<u32> {
    HEADER.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("#define"), Some(n), Some(value)) if n == name => value.parse().ok(),
            _ => None,
        }
    })
}

#[rstest]
#[case("KANA_BRIDGE_OK", BridgeCode::Ok)]
#[case("KANA_BRIDGE_INVALID_PARAMETER_VALUE", BridgeCode::InvalidParameterValue)]
#[case("KANA_BRIDGE_OUT_OF_MEMORY", BridgeCode::OutOfMemory)]
#[case("KANA_BRIDGE_INTERNAL", BridgeCode::Internal)]
#[case("KANA_BRIDGE_NOT_REGISTERED", BridgeCode::NotRegistered)]
#[case("KANA_BRIDGE_ALREADY_REGISTERED", BridgeCode::AlreadyRegistered)]
fn header_status_codes_match(#[case] name: &str, #[case] code: BridgeCode) {
    assert_eq!(header_define(name), Some(code as u32));
}

#[test]
fn header_declares_every_export() {
    assert_eq!(header_define("KANA_BRIDGE_API_VERSION"), Some(API_VERSION));
    for export in [
        "kana_bridge_api_version(",
        "kana_bridge_register(",
        "kana_bridge_init(",
        "kana_bridge_convert(",
        "kana_bridge_sqlstate(",
    ] {
        assert!(HEADER.contains(export), "{export} missing from header");
    }
}

#[test]
fn postgres_glue_registers_on_load_and_raises_the_bridge_sqlstate() {
    let init = PG_GLUE.split("_PG_init(void)\n{").nth(1).expect("_PG_init body");
    assert!(init.contains("kana_bridge_init()"));
    assert!(PG_GLUE.contains("kana_bridge_sqlstate(code)"));
    assert!(PG_GLUE.contains("MCXT_ALLOC_NO_OOM"));
    // Raising happens only once the bridge call has returned.
    let convert = PG_GLUE.find("kana_bridge_convert(&host").expect("convert call");
    let raise = PG_GLUE.rfind("raise_status(code, out.message)").expect("raise");
    assert!(raise > convert);
}
