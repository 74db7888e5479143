//! Foreign side of the boundary: the conversion routine and the memory it owns.

pub mod domain;
pub mod loader;
pub mod owned;
pub mod routine;

pub use domain::{ConvertFn, ForeignResult, ForeignReturn};
pub use loader::LoadedRoutine;
pub use owned::{release_with_free, ForeignString, ReleaseFn};
pub use routine::{FnRoutine, ForeignRoutine};
