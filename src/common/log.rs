//! Logging setup. The bridge lives inside a host process, so the subscriber
//! writes to stderr and never replaces one the host already installed.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::config::{BridgeCfg, LogFormat};

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Install the global subscriber once. Returns whether this call (or an
/// earlier one) installed ours.
pub fn init(cfg: &BridgeCfg) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
        let registry = tracing_subscriber::registry().with(filter);
        let installed = match cfg.log_format {
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Text => registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init(),
        };
        installed.is_ok()
    })
}
