use thiserror::Error;

use std::io;

pub type Result<T> = std::result::Result<T, WriterError>;

/// Every failure a write call can surface.
///
/// All variants describe caller misuse of the writer (or a failing sink);
/// none of them are retried or repaired internally.
#[derive(Debug, Error)]
pub enum WriterError {
    /// Errors related to call sequencing
    #[error("attribute without open start tag")]
    AttributeWithoutStartTag,

    #[error("namespace declaration without open start tag")]
    NamespaceWithoutStartTag,

    #[error("No open start element, when trying to write end element")]
    NoOpenElement,

    #[error("Trying to output second root element, `<{name}>`")]
    SecondRootElement { name: String },

    #[error("XML declaration can only be written before any other output")]
    MisplacedDeclaration,

    #[error("Can not write after the document has been ended")]
    DocumentEnded,

    /// Errors related to namespace resolution
    #[error("Unbound namespace URI '{uri}'")]
    UnboundNamespace { uri: String },

    #[error("Illegal binding of prefix `{prefix}` to namespace URI '{uri}'")]
    ReservedPrefix { prefix: String, uri: String },

    /// Errors related to content validity
    #[error("Illegal name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Duplicate attribute `{name}`")]
    DuplicateAttribute { name: String },

    #[error("Illegal {what} content: {reason}")]
    InvalidContent {
        what: &'static str,
        reason: &'static str,
    },

    #[error("An I/O error has occurred while writing output: {0}")]
    Io(#[from] io::Error),
}

impl WriterError {
    pub(crate) fn unbound(uri: impl Into<String>) -> Self {
        WriterError::UnboundNamespace { uri: uri.into() }
    }

    /// True for errors caused by calling operations in an illegal order.
    pub fn is_sequencing_error(&self) -> bool {
        matches!(
            self,
            WriterError::AttributeWithoutStartTag
                | WriterError::NamespaceWithoutStartTag
                | WriterError::NoOpenElement
                | WriterError::SecondRootElement { .. }
                | WriterError::MisplacedDeclaration
                | WriterError::DocumentEnded
        )
    }
}
