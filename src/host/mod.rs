//! Host side of the boundary: argument spans, per-call arenas and native text.

pub mod arena;
pub mod callbacks;
pub mod domain;

pub use arena::{ArenaHost, ArenaText};
pub use callbacks::{CallbackHost, HostCallbacks};
pub use domain::{Host, HostMessage, TextArgument};
