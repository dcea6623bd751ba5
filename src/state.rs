//! Call-sequencing states of the writer.
//!
//! Every public write operation is classified as a [`Call`] and checked
//! against the current [`WriterState`] before anything is emitted. The table
//! in [`WriterState::step`] is the single place where the legal call order is
//! defined.

use crate::err::{Result, WriterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing open: before the root element or after it was closed.
    NoOpenElement,
    /// A start tag was emitted and not yet closed; attributes and namespace
    /// declarations are legal. `empty` marks a self-closing element.
    StartTagOpen { empty: bool },
    /// Inside element content.
    InContent,
    /// `write_end_document` was called; nothing else may follow.
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Declaration,
    StartElement,
    Attribute,
    Namespace,
    Content,
    EndElement,
    EndDocument,
}

/// What the writer must do before carrying out a legal call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Proceed,
    /// The pending start tag has to be closed first.
    CloseStartTag { empty: bool },
}

impl WriterState {
    pub(crate) fn step(self, call: Call) -> Result<Step> {
        use WriterState::*;

        match (self, call) {
            (Ended, _) => Err(WriterError::DocumentEnded),

            (StartTagOpen { .. }, Call::Attribute | Call::Namespace) => Ok(Step::Proceed),
            (_, Call::Attribute) => Err(WriterError::AttributeWithoutStartTag),
            (_, Call::Namespace) => Err(WriterError::NamespaceWithoutStartTag),

            (NoOpenElement, Call::Declaration) => Ok(Step::Proceed),
            (_, Call::Declaration) => Err(WriterError::MisplacedDeclaration),

            (StartTagOpen { empty }, _) => Ok(Step::CloseStartTag { empty }),
            (NoOpenElement | InContent, _) => Ok(Step::Proceed),
        }
    }
}
