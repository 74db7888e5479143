//! Runtime configuration loaded from the process environment.

use std::env;
use std::path::PathBuf;

use super::error::{BridgeError, BridgeResult};

pub const LIBRARY_KEY: &str = "KANA_BRIDGE_LIBRARY";
pub const CONVERT_SYMBOL_KEY: &str = "KANA_BRIDGE_CONVERT_SYMBOL";
pub const RELEASE_SYMBOL_KEY: &str = "KANA_BRIDGE_RELEASE_SYMBOL";
pub const LOG_KEY: &str = "KANA_BRIDGE_LOG";
pub const LOG_FORMAT_KEY: &str = "KANA_BRIDGE_LOG_FORMAT";
pub const ARENA_LIMIT_KEY: &str = "KANA_BRIDGE_ARENA_LIMIT";

/// Symbol exported by the cgo build of the converter.
pub const DEFAULT_CONVERT_SYMBOL: &str = "udf_go_convert_kana";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Snapshot of configuration values consumed by the bridge.
#[derive(Clone, Debug)]
pub struct BridgeCfg {
    pub library: Option<PathBuf>,
    pub convert_symbol: String,
    pub release_symbol: Option<String>,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub arena_limit: Option<usize>,
}

impl Default for BridgeCfg {
    fn default() -> Self {
        Self {
            library: None,
            convert_symbol: DEFAULT_CONVERT_SYMBOL.to_string(),
            release_symbol: None,
            log_filter: "warn".to_string(),
            log_format: LogFormat::Json,
            arena_limit: None,
        }
    }
}

impl BridgeCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> BridgeResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let log_format = match get(LOG_FORMAT_KEY).as_deref().map(str::trim) {
            None => defaults.log_format,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(other) => {
                return Err(BridgeError::config(
                    LOG_FORMAT_KEY,
                    format!("expected `json` or `text`, got `{other}`"),
                ))
            }
        };

        let arena_limit = match get(ARENA_LIMIT_KEY) {
            None => None,
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|err| {
                BridgeError::config(ARENA_LIMIT_KEY, format!("`{raw}`: {err}"))
            })?),
        };

        Ok(Self {
            library: get(LIBRARY_KEY).map(PathBuf::from),
            convert_symbol: get(CONVERT_SYMBOL_KEY).unwrap_or(defaults.convert_symbol),
            release_symbol: get(RELEASE_SYMBOL_KEY),
            log_filter: get(LOG_KEY).unwrap_or(defaults.log_filter),
            log_format,
            arena_limit,
        })
    }
}
