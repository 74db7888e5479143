//! Resolve the conversion routine from a shared library with `libloading`.
//!
//! TODO: refuse libraries whose exported ABI version differs from `API_VERSION`.

use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::info;

use super::domain::{ConvertFn, ForeignReturn};
use super::owned::{release_with_free, ReleaseFn};
use super::routine::{FnRoutine, ForeignRoutine};
use crate::common::config::{BridgeCfg, LIBRARY_KEY};
use crate::common::error::{BridgeError, BridgeResult};

/// A routine resolved from a loaded library. The library stays mapped for as
/// long as this value lives, which keeps the copied function pointers valid.
pub struct LoadedRoutine {
    routine: FnRoutine,
    path: PathBuf,
    _library: Library,
}

impl LoadedRoutine {
    /// Load `path` and resolve the conversion symbol and, if named, the
    /// release symbol. Without a release symbol strings are freed with `free(3)`.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers. The symbols must have the
    /// [`ConvertFn`] and [`ReleaseFn`] signatures.
    pub unsafe fn open(path: &Path, convert_symbol: &str, release_symbol: Option<&str>) -> BridgeResult<Self> {
        let library =
            Library::new(path).map_err(|err| BridgeError::Load(format!("{}: {err}", path.display())))?;

        let convert: ConvertFn = *library
            .get::<ConvertFn>(convert_symbol.as_bytes())
            .map_err(|err| BridgeError::Load(format!("symbol `{convert_symbol}`: {err}")))?;

        let release: ReleaseFn = match release_symbol {
            Some(name) => *library
                .get::<ReleaseFn>(name.as_bytes())
                .map_err(|err| BridgeError::Load(format!("symbol `{name}`: {err}")))?,
            None => release_with_free,
        };

        info!(
            library = %path.display(),
            convert = convert_symbol,
            release = release_symbol.unwrap_or("free"),
            "foreign routine loaded"
        );

        Ok(Self {
            routine: FnRoutine::with_release(convert, release),
            path: path.to_path_buf(),
            _library: library,
        })
    }

    /// Load the routine named by the configuration.
    ///
    /// # Safety
    ///
    /// Same as [`LoadedRoutine::open`].
    pub unsafe fn from_cfg(cfg: &BridgeCfg) -> BridgeResult<Self> {
        let path = cfg
            .library
            .as_deref()
            .ok_or_else(|| BridgeError::config(LIBRARY_KEY, "not set"))?;
        Self::open(path, &cfg.convert_symbol, cfg.release_symbol.as_deref())
    }

    /// Path the library was opened from, as configured.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ForeignRoutine for LoadedRoutine {
    unsafe fn call(&self, input: *const c_char, mode: *const c_char) -> ForeignReturn {
        self.routine.call(input, mode)
    }

    fn release(&self) -> ReleaseFn {
        self.routine.release()
    }
}
