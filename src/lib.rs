#![deny(unused_must_use)]
#![forbid(unsafe_code)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]

pub mod element_stack;
pub mod err;
pub mod name_table;
pub mod namespace;
pub mod qname;
pub mod script;
pub mod settings;
pub mod sink;
pub mod state;
pub mod typed_value;
pub mod utils;
pub mod writer;

pub use element_stack::{ElementScope, ElementStack};
pub use err::{Result, WriterError};
pub use name_table::NameTable;
pub use namespace::{
    NamespaceContext, SimpleNamespaceContext, XML_NS_PREFIX, XML_NS_URI, XMLNS_ATTRIBUTE,
    XMLNS_ATTRIBUTE_NS_URI,
};
pub use qname::{QName, serialize_qname};
pub use settings::WriterSettings;
pub use sink::{RecordingSink, SinkEvent, XmlByteSink, XmlSink};
pub use state::{Call, WriterState};
pub use typed_value::{TypedValue, ValueEncoder};
pub use writer::NonRepairingWriter;

#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}
