pub(crate) mod names;

pub use self::names::ncname_error;
pub(crate) use self::names::{verify_ncname, verify_qualified};
