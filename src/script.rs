//! JSON write scripts.
//!
//! A script is a JSON array of write operations, each tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "start_element", "local": "root"},
//!   {"op": "namespace", "prefix": "p", "uri": "urn:x"},
//!   {"op": "attribute", "uri": "urn:x", "local": "a", "value": "1"},
//!   {"op": "end_document"}
//! ]
//! ```
//!
//! Element and attribute operations pick the writer call from the fields
//! present: with `prefix` the prefix is used verbatim, with only `uri` it is
//! looked up, and with neither the name is in no namespace.

use crate::err::WriterError;
use crate::sink::XmlSink;
use crate::typed_value::TypedValue;
use crate::writer::NonRepairingWriter;

use jiff::Timestamp;
use log::debug;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to parse write script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Operation #{index} (`{op}`) failed")]
    Operation {
        index: usize,
        op: &'static str,
        #[source]
        source: WriterError,
    },
}

/// A typed value as it appears in a script: `{"type": "int", "value": 5}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScriptValue {
    Int(i64),
    #[serde(rename = "uint")]
    UInt(u64),
    Float(f64),
    Bool(bool),
    HexBinary(Vec<u8>),
    IntList(Vec<i64>),
    Timestamp(Timestamp),
}

impl ScriptValue {
    pub fn as_typed(&self) -> TypedValue<'_> {
        match self {
            ScriptValue::Int(v) => TypedValue::Int(*v),
            ScriptValue::UInt(v) => TypedValue::UInt(*v),
            ScriptValue::Float(v) => TypedValue::Float(*v),
            ScriptValue::Bool(v) => TypedValue::Bool(*v),
            ScriptValue::HexBinary(bytes) => TypedValue::HexBinary(bytes),
            ScriptValue::IntList(items) => TypedValue::IntList(items),
            ScriptValue::Timestamp(ts) => TypedValue::Timestamp(*ts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    StartDocument {
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    EndDocument,
    StartElement {
        prefix: Option<String>,
        uri: Option<String>,
        local: String,
    },
    EmptyElement {
        prefix: Option<String>,
        uri: Option<String>,
        local: String,
    },
    EndElement,
    Attribute {
        prefix: Option<String>,
        uri: Option<String>,
        local: String,
        value: String,
    },
    TypedAttribute {
        prefix: Option<String>,
        #[serde(default)]
        uri: String,
        local: String,
        value: ScriptValue,
    },
    Namespace {
        prefix: Option<String>,
        uri: String,
    },
    DefaultNamespace {
        uri: String,
    },
    SetPrefix {
        prefix: Option<String>,
        uri: String,
    },
    SetDefaultNamespace {
        uri: String,
    },
    Characters {
        text: String,
    },
    TypedCharacters {
        value: ScriptValue,
    },
    Cdata {
        data: String,
    },
    Comment {
        text: String,
    },
    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },
    EntityRef {
        name: String,
    },
}

impl WriteOp {
    pub fn name(&self) -> &'static str {
        match self {
            WriteOp::StartDocument { .. } => "start_document",
            WriteOp::EndDocument => "end_document",
            WriteOp::StartElement { .. } => "start_element",
            WriteOp::EmptyElement { .. } => "empty_element",
            WriteOp::EndElement => "end_element",
            WriteOp::Attribute { .. } => "attribute",
            WriteOp::TypedAttribute { .. } => "typed_attribute",
            WriteOp::Namespace { .. } => "namespace",
            WriteOp::DefaultNamespace { .. } => "default_namespace",
            WriteOp::SetPrefix { .. } => "set_prefix",
            WriteOp::SetDefaultNamespace { .. } => "set_default_namespace",
            WriteOp::Characters { .. } => "characters",
            WriteOp::TypedCharacters { .. } => "typed_characters",
            WriteOp::Cdata { .. } => "cdata",
            WriteOp::Comment { .. } => "comment",
            WriteOp::ProcessingInstruction { .. } => "processing_instruction",
            WriteOp::EntityRef { .. } => "entity_ref",
        }
    }

    pub fn apply<S: XmlSink>(&self, writer: &mut NonRepairingWriter<S>) -> crate::err::Result<()> {
        match self {
            WriteOp::StartDocument {
                version,
                encoding,
                standalone,
            } => match (version, encoding, standalone) {
                (None, None, None) => writer.write_start_document(),
                _ => {
                    let version = version
                        .clone()
                        .unwrap_or_else(|| writer.settings().get_xml_version().to_owned());
                    writer.write_start_document_with(&version, encoding.as_deref(), *standalone)
                }
            },
            WriteOp::EndDocument => writer.write_end_document(),
            WriteOp::StartElement { prefix, uri, local } => match (prefix, uri) {
                (Some(prefix), uri) => writer.write_start_element_prefixed(
                    Some(prefix.as_str()),
                    local,
                    uri.as_deref().unwrap_or(""),
                ),
                (None, Some(uri)) => writer.write_start_element(uri, local),
                (None, None) => writer.write_start_element_local(local),
            },
            WriteOp::EmptyElement { prefix, uri, local } => match (prefix, uri) {
                (Some(prefix), uri) => writer.write_empty_element_prefixed(
                    Some(prefix.as_str()),
                    local,
                    uri.as_deref().unwrap_or(""),
                ),
                (None, Some(uri)) => writer.write_empty_element(uri, local),
                (None, None) => writer.write_empty_element_local(local),
            },
            WriteOp::EndElement => writer.write_end_element(),
            WriteOp::Attribute {
                prefix,
                uri,
                local,
                value,
            } => match (prefix, uri) {
                (Some(prefix), uri) => writer.write_attribute_prefixed(
                    Some(prefix.as_str()),
                    uri.as_deref().unwrap_or(""),
                    local,
                    value,
                ),
                (None, Some(uri)) => writer.write_attribute(uri, local, value),
                (None, None) => writer.write_attribute_local(local, value),
            },
            WriteOp::TypedAttribute {
                prefix,
                uri,
                local,
                value,
            } => writer.write_typed_attribute(prefix.as_deref(), uri, local, &value.as_typed()),
            WriteOp::Namespace { prefix, uri } => writer.write_namespace(prefix.as_deref(), uri),
            WriteOp::DefaultNamespace { uri } => writer.write_default_namespace(uri),
            WriteOp::SetPrefix { prefix, uri } => writer.set_prefix(prefix.as_deref(), uri),
            WriteOp::SetDefaultNamespace { uri } => writer.set_default_namespace(uri),
            WriteOp::Characters { text } => writer.write_characters(text),
            WriteOp::TypedCharacters { value } => writer.write_typed_characters(&value.as_typed()),
            WriteOp::Cdata { data } => writer.write_cdata(data),
            WriteOp::Comment { text } => writer.write_comment(text),
            WriteOp::ProcessingInstruction { target, data } => {
                writer.write_processing_instruction(target, data.as_deref())
            }
            WriteOp::EntityRef { name } => writer.write_entity_ref(name),
        }
    }
}

/// An ordered list of [`WriteOp`]s.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WriteScript {
    ops: Vec<WriteOp>,
}

impl WriteScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ScriptError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Replays every operation in order, stopping at the first failure.
    pub fn apply<S: XmlSink>(&self, writer: &mut NonRepairingWriter<S>) -> Result<(), ScriptError> {
        debug!("replaying {} operations", self.ops.len());
        for (index, op) in self.ops.iter().enumerate() {
            op.apply(writer).map_err(|source| ScriptError::Operation {
                index,
                op: op.name(),
                source,
            })?;
        }
        Ok(())
    }
}
