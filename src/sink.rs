//! Output sinks.
//!
//! The writer front end resolves names and enforces call order; a sink only
//! serializes the resolved events it receives. [`XmlByteSink`] writes XML
//! text to any `io::Write`, escaping text and attribute values on the fly.
//! [`RecordingSink`] keeps the events in memory.

use crate::err::{Result, WriterError};
use crate::qname::QName;
use crate::typed_value::ValueEncoder;

use log::trace;
use quick_xml::escape::{escape, partial_escape};
use std::borrow::Cow;
use std::io::Write;

/// Tab, newline and carriage return become character references, so that
/// attribute value normalization keeps them.
fn escape_attr_whitespace(escaped: Cow<'_, str>) -> Cow<'_, str> {
    if !escaped.contains(['\t', '\n', '\r']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Receiver of fully resolved write events.
pub trait XmlSink {
    fn write_xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<()>;

    /// Called on `<name`; the tag stays open for attributes and declarations.
    fn write_start_tag(&mut self, name: &QName) -> Result<()>;
    fn write_attribute(&mut self, name: &QName, value: &str) -> Result<()>;
    fn write_typed_attribute(&mut self, name: &QName, value: &dyn ValueEncoder) -> Result<()>;
    fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()>;
    fn write_default_namespace(&mut self, uri: &str) -> Result<()>;
    /// Called on `>` or `/>`.
    fn close_start_tag(&mut self, empty: bool) -> Result<()>;
    fn write_end_tag(&mut self, name: &QName) -> Result<()>;

    fn write_characters(&mut self, text: &str) -> Result<()>;
    fn write_typed_characters(&mut self, value: &dyn ValueEncoder) -> Result<()>;
    fn write_cdata(&mut self, data: &str) -> Result<()>;
    fn write_comment(&mut self, text: &str) -> Result<()>;
    fn write_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Result<()>;
    fn write_entity_ref(&mut self, name: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

fn check_cdata(data: &str) -> Result<()> {
    if data.contains("]]>") {
        return Err(WriterError::InvalidContent {
            what: "CDATA",
            reason: "contains `]]>`",
        });
    }
    Ok(())
}

fn check_comment(text: &str) -> Result<()> {
    if text.contains("--") || text.ends_with('-') {
        return Err(WriterError::InvalidContent {
            what: "comment",
            reason: "contains `--` or ends with `-`",
        });
    }
    Ok(())
}

fn check_pi_data(data: &str) -> Result<()> {
    if data.contains("?>") {
        return Err(WriterError::InvalidContent {
            what: "processing instruction",
            reason: "contains `?>`",
        });
    }
    Ok(())
}

/// Serializes events as XML text into an `io::Write`.
pub struct XmlByteSink<W: Write> {
    writer: W,
    scratch: String,
}

impl<W: Write> XmlByteSink<W> {
    pub fn new(writer: W) -> Self {
        XmlByteSink {
            writer,
            scratch: String::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    #[inline]
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    fn write_name(&mut self, name: &QName) -> Result<()> {
        if let Some(prefix) = name.prefix() {
            self.write_str(prefix)?;
            self.write_bytes(b":")?;
        }
        self.write_str(name.local_name())
    }

    fn write_quoted_attr_value(&mut self, value: &str) -> Result<()> {
        self.write_bytes(b"=\"")?;
        let escaped = escape_attr_whitespace(escape(value));
        self.writer.write_all(escaped.as_bytes())?;
        self.write_bytes(b"\"")
    }

    fn write_encoded(&mut self, value: &dyn ValueEncoder) -> Result<()> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        value.encode(&mut scratch);
        let res = self.write_str(&scratch);
        self.scratch = scratch;
        res
    }
}

impl<W: Write> XmlSink for XmlByteSink<W> {
    fn write_xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<()> {
        trace!("write_xml_declaration: {} {:?} {:?}", version, encoding, standalone);
        self.write_bytes(b"<?xml version=\"")?;
        self.write_str(version)?;
        self.write_bytes(b"\"")?;
        if let Some(encoding) = encoding {
            self.write_bytes(b" encoding=\"")?;
            self.write_str(encoding)?;
            self.write_bytes(b"\"")?;
        }
        if let Some(standalone) = standalone {
            self.write_str(if standalone {
                " standalone=\"yes\""
            } else {
                " standalone=\"no\""
            })?;
        }
        self.write_bytes(b"?>")
    }

    fn write_start_tag(&mut self, name: &QName) -> Result<()> {
        self.write_bytes(b"<")?;
        self.write_name(name)
    }

    fn write_attribute(&mut self, name: &QName, value: &str) -> Result<()> {
        self.write_bytes(b" ")?;
        self.write_name(name)?;
        self.write_quoted_attr_value(value)
    }

    fn write_typed_attribute(&mut self, name: &QName, value: &dyn ValueEncoder) -> Result<()> {
        self.write_bytes(b" ")?;
        self.write_name(name)?;
        self.write_bytes(b"=\"")?;
        self.write_encoded(value)?;
        self.write_bytes(b"\"")
    }

    fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.write_bytes(b" xmlns:")?;
        self.write_str(prefix)?;
        self.write_quoted_attr_value(uri)
    }

    fn write_default_namespace(&mut self, uri: &str) -> Result<()> {
        self.write_bytes(b" xmlns")?;
        self.write_quoted_attr_value(uri)
    }

    fn close_start_tag(&mut self, empty: bool) -> Result<()> {
        self.write_str(if empty { "/>" } else { ">" })
    }

    fn write_end_tag(&mut self, name: &QName) -> Result<()> {
        self.write_bytes(b"</")?;
        self.write_name(name)?;
        self.write_bytes(b">")
    }

    fn write_characters(&mut self, text: &str) -> Result<()> {
        let escaped = partial_escape(text);
        self.writer.write_all(escaped.as_bytes())?;
        Ok(())
    }

    fn write_typed_characters(&mut self, value: &dyn ValueEncoder) -> Result<()> {
        self.write_encoded(value)
    }

    fn write_cdata(&mut self, data: &str) -> Result<()> {
        check_cdata(data)?;
        self.write_bytes(b"<![CDATA[")?;
        self.write_str(data)?;
        self.write_bytes(b"]]>")
    }

    fn write_comment(&mut self, text: &str) -> Result<()> {
        check_comment(text)?;
        self.write_bytes(b"<!--")?;
        self.write_str(text)?;
        self.write_bytes(b"-->")
    }

    fn write_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Result<()> {
        let data = data.filter(|d| !d.is_empty());
        if let Some(data) = data {
            check_pi_data(data)?;
        }
        self.write_bytes(b"<?")?;
        self.write_str(target)?;
        if let Some(data) = data {
            self.write_bytes(b" ")?;
            self.write_str(data)?;
        }
        self.write_bytes(b"?>")
    }

    fn write_entity_ref(&mut self, name: &str) -> Result<()> {
        self.write_bytes(b"&")?;
        self.write_str(name)?;
        self.write_bytes(b";")
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A resolved event as received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    XmlDeclaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    StartTag(QName),
    Attribute(QName, String),
    Namespace(String, String),
    DefaultNamespace(String),
    CloseStartTag { empty: bool },
    EndTag(QName),
    Characters(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String, Option<String>),
    EntityRef(String),
    Flush,
}

/// Keeps every event in memory, in order. Typed values are stored encoded.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SinkEvent> {
        self.events
    }

    fn push(&mut self, event: SinkEvent) -> Result<()> {
        trace!("recording {:?}", event);
        self.events.push(event);
        Ok(())
    }
}

impl XmlSink for RecordingSink {
    fn write_xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<()> {
        self.push(SinkEvent::XmlDeclaration {
            version: version.to_owned(),
            encoding: encoding.map(str::to_owned),
            standalone,
        })
    }

    fn write_start_tag(&mut self, name: &QName) -> Result<()> {
        self.push(SinkEvent::StartTag(name.clone()))
    }

    fn write_attribute(&mut self, name: &QName, value: &str) -> Result<()> {
        self.push(SinkEvent::Attribute(name.clone(), value.to_owned()))
    }

    fn write_typed_attribute(&mut self, name: &QName, value: &dyn ValueEncoder) -> Result<()> {
        self.push(SinkEvent::Attribute(name.clone(), value.encode_to_string()))
    }

    fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.push(SinkEvent::Namespace(prefix.to_owned(), uri.to_owned()))
    }

    fn write_default_namespace(&mut self, uri: &str) -> Result<()> {
        self.push(SinkEvent::DefaultNamespace(uri.to_owned()))
    }

    fn close_start_tag(&mut self, empty: bool) -> Result<()> {
        self.push(SinkEvent::CloseStartTag { empty })
    }

    fn write_end_tag(&mut self, name: &QName) -> Result<()> {
        self.push(SinkEvent::EndTag(name.clone()))
    }

    fn write_characters(&mut self, text: &str) -> Result<()> {
        self.push(SinkEvent::Characters(text.to_owned()))
    }

    fn write_typed_characters(&mut self, value: &dyn ValueEncoder) -> Result<()> {
        self.push(SinkEvent::Characters(value.encode_to_string()))
    }

    fn write_cdata(&mut self, data: &str) -> Result<()> {
        check_cdata(data)?;
        self.push(SinkEvent::CData(data.to_owned()))
    }

    fn write_comment(&mut self, text: &str) -> Result<()> {
        check_comment(text)?;
        self.push(SinkEvent::Comment(text.to_owned()))
    }

    fn write_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Result<()> {
        if let Some(data) = data {
            check_pi_data(data)?;
        }
        self.push(SinkEvent::ProcessingInstruction(
            target.to_owned(),
            data.map(str::to_owned),
        ))
    }

    fn write_entity_ref(&mut self, name: &str) -> Result<()> {
        self.push(SinkEvent::EntityRef(name.to_owned()))
    }

    fn flush(&mut self) -> Result<()> {
        self.push(SinkEvent::Flush)
    }
}
