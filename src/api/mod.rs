//! Public entry points for host glue: the generic C ABI and the MySQL
//! loadable-function convention.

pub mod ffi;
pub mod mysql;
