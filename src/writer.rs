//! The non-repairing writer front end.
//!
//! [`NonRepairingWriter`] accepts structured write calls, checks them against
//! the call-sequencing table in [`crate::state`], resolves namespace URIs to
//! interned qualified names and forwards the resolved events to an
//! [`XmlSink`].
//!
//! Resolution rules:
//! - Elements written by URI use any visible prefix, including the default
//!   namespace (in which case the name is unprefixed).
//! - Attributes written by URI only use explicitly declared prefixes, since
//!   unprefixed attributes never belong to the default namespace. An empty
//!   URI means "no namespace" and yields an unprefixed name.
//! - Forms taking an explicit prefix use it verbatim, with no lookup.
//! - A URI that cannot be resolved is an error. This writer never invents a
//!   prefix binding.
//!
//! Declaring a namespace (`write_namespace`, `write_default_namespace`) both
//! emits the declaration and binds it on the current element, so that names
//! written right after the declaration resolve against it.

use crate::element_stack::ElementStack;
use crate::err::{Result, WriterError};
use crate::name_table::NameTable;
use crate::namespace::{
    NamespaceContext, XML_NS_PREFIX, XML_NS_URI, is_legal_binding, is_legal_default_binding,
};
use crate::qname::QName;
use crate::settings::WriterSettings;
use crate::sink::XmlSink;
use crate::state::{Call, Step, WriterState};
use crate::typed_value::{TypedValue, ValueEncoder};
use crate::utils::{verify_ncname, verify_qualified};

use log::{debug, trace};

/// A namespace declaration that is emitted and bound in one step.
#[derive(Debug, Clone, Copy)]
enum Binding<'a> {
    Default(&'a str),
    Prefixed(&'a str, &'a str),
}

enum AttributeValue<'a> {
    Text(&'a str),
    Typed(&'a dyn ValueEncoder),
}

pub struct NonRepairingWriter<S: XmlSink> {
    sink: S,
    settings: WriterSettings,
    symbols: NameTable,
    elements: ElementStack,
    root_ns_context: Option<Box<dyn NamespaceContext>>,
    state: WriterState,
    wrote_anything: bool,
    root_closed: bool,
}

impl<S: XmlSink> NonRepairingWriter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_settings(sink, WriterSettings::default())
    }

    pub fn with_settings(sink: S, settings: WriterSettings) -> Self {
        NonRepairingWriter {
            sink,
            settings,
            symbols: NameTable::new(),
            elements: ElementStack::new(),
            root_ns_context: None,
            state: WriterState::NoOpenElement,
            wrote_anything: false,
            root_closed: false,
        }
    }

    /// Installs the document-root namespace context, consulted after every
    /// element scope.
    pub fn with_root_namespace_context(mut self, ctx: impl NamespaceContext + 'static) -> Self {
        self.root_ns_context = Some(Box::new(ctx));
        self
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.elements.depth()
    }

    pub fn element_stack(&self) -> &ElementStack {
        &self.elements
    }

    pub fn name_table(&self) -> &NameTable {
        &self.symbols
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Interned name for `prefix` and `local`, e.g. for [`Self::write_qname`].
    pub fn intern(&mut self, prefix: Option<&str>, local: &str) -> QName {
        self.symbols.find(prefix, local)
    }

    /// Any visible prefix bound to `uri`; `Some("")` denotes the default namespace.
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.elements
            .get_prefix(uri, self.root_ns_context.as_deref())
    }

    pub fn get_namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.elements
            .get_namespace_uri(prefix, self.root_ns_context.as_deref())
    }

    /*
     * Call sequencing
     */

    fn begin(&mut self, call: Call) -> Result<()> {
        if let Step::CloseStartTag { empty } = self.state.step(call)? {
            self.close_start_tag(empty)?;
        }
        Ok(())
    }

    fn close_start_tag(&mut self, empty: bool) -> Result<()> {
        self.sink.close_start_tag(empty)?;
        if empty {
            self.elements.pop();
            self.after_element_closed();
        } else {
            self.state = WriterState::InContent;
        }
        Ok(())
    }

    /// Closes a pending start tag ahead of an end element. Returns `true` when
    /// that already closed the element itself (`<a/>`).
    fn close_start_tag_for_end(&mut self, empty: bool) -> Result<bool> {
        if !empty && self.settings.should_use_automatic_empty_elements() {
            self.close_start_tag(true)?;
            return Ok(true);
        }
        self.close_start_tag(empty)?;
        Ok(false)
    }

    fn after_element_closed(&mut self) {
        if self.elements.is_at_document_level() {
            self.state = WriterState::NoOpenElement;
            self.root_closed = true;
        } else {
            self.state = WriterState::InContent;
        }
    }

    fn begin_start_element(&mut self, local: &str) -> Result<()> {
        self.begin(Call::StartElement)?;
        if self.settings.should_check_structure()
            && self.root_closed
            && self.elements.is_at_document_level()
        {
            return Err(WriterError::SecondRootElement {
                name: local.to_owned(),
            });
        }
        Ok(())
    }

    fn begin_content(&mut self, what: &'static str, legal_outside_root: bool) -> Result<()> {
        self.begin(Call::Content)?;
        if !legal_outside_root
            && self.settings.should_check_structure()
            && self.elements.is_at_document_level()
        {
            return Err(WriterError::InvalidContent {
                what,
                reason: "not allowed outside the root element",
            });
        }
        Ok(())
    }

    fn after_content(&mut self) {
        self.wrote_anything = true;
        if !self.elements.is_at_document_level() {
            self.state = WriterState::InContent;
        }
    }

    /*
     * Document framing
     */

    /// Writes the XML declaration using the configured version and encoding.
    pub fn write_start_document(&mut self) -> Result<()> {
        let version = self.settings.get_xml_version().to_owned();
        let encoding = self.settings.get_encoding().to_owned();
        self.write_start_document_with(&version, Some(&encoding), None)
    }

    pub fn write_start_document_with(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<()> {
        trace!("write_start_document: {}", version);
        self.begin(Call::Declaration)?;
        if self.wrote_anything {
            return Err(WriterError::MisplacedDeclaration);
        }
        self.sink
            .write_xml_declaration(version, encoding, standalone)?;
        self.wrote_anything = true;
        Ok(())
    }

    /// Closes every open element and flushes the sink. No writes may follow.
    pub fn write_end_document(&mut self) -> Result<()> {
        trace!("write_end_document");
        if let Step::CloseStartTag { empty } = self.state.step(Call::EndDocument)? {
            self.close_start_tag_for_end(empty)?;
        }
        while let Some(scope) = self.elements.pop() {
            if let Some(name) = scope.name() {
                self.sink.write_end_tag(name)?;
            }
        }
        self.sink.flush()?;
        self.state = WriterState::Ended;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    /*
     * Elements
     */

    fn write_start_tag(&mut self, name: QName, empty: bool) -> Result<()> {
        trace!("start tag `{}` (empty: {})", name, empty);
        self.sink.write_start_tag(&name)?;
        self.elements.push(name);
        self.state = WriterState::StartTagOpen { empty };
        self.wrote_anything = true;
        Ok(())
    }

    /// Interns the name for `uri` and `local` using any visible binding.
    fn resolve_element_name(&mut self, uri: &str, local: &str) -> Result<QName> {
        let root = self.root_ns_context.as_deref();
        let prefix = match self.elements.get_prefix(uri, root) {
            None => return Err(WriterError::unbound(uri)),
            Some("") => None,
            Some(prefix) => Some(prefix),
        };
        if self.settings.should_check_names() {
            verify_qualified(prefix, local)?;
        }
        Ok(self.symbols.find(prefix, local))
    }

    fn verbatim_element_name(&mut self, prefix: Option<&str>, local: &str) -> Result<QName> {
        if self.settings.should_check_names() {
            verify_qualified(prefix, local)?;
        }
        Ok(self.symbols.find(prefix, local))
    }

    /// Element in no namespace; no lookup is done.
    pub fn write_start_element_local(&mut self, local: &str) -> Result<()> {
        trace!("write_start_element_local: {}", local);
        self.begin_start_element(local)?;
        let name = self.verbatim_element_name(None, local)?;
        self.write_start_tag(name, false)
    }

    /// Element whose prefix is looked up from `uri` (explicit or default binding).
    pub fn write_start_element(&mut self, uri: &str, local: &str) -> Result<()> {
        trace!("write_start_element: {{{}}}{}", uri, local);
        self.begin_start_element(local)?;
        let name = self.resolve_element_name(uri, local)?;
        self.write_start_tag(name, false)
    }

    /// Element with a caller-chosen prefix. The prefix is not bound by this call.
    pub fn write_start_element_prefixed(
        &mut self,
        prefix: Option<&str>,
        local: &str,
        uri: &str,
    ) -> Result<()> {
        trace!("write_start_element_prefixed: {:?}:{} ('{}')", prefix, local, uri);
        self.begin_start_element(local)?;
        let name = self.verbatim_element_name(prefix, local)?;
        self.write_start_tag(name, false)
    }

    pub fn write_empty_element_local(&mut self, local: &str) -> Result<()> {
        trace!("write_empty_element_local: {}", local);
        self.begin_start_element(local)?;
        let name = self.verbatim_element_name(None, local)?;
        self.write_start_tag(name, true)
    }

    pub fn write_empty_element(&mut self, uri: &str, local: &str) -> Result<()> {
        trace!("write_empty_element: {{{}}}{}", uri, local);
        self.begin_start_element(local)?;
        let name = self.resolve_element_name(uri, local)?;
        self.write_start_tag(name, true)
    }

    pub fn write_empty_element_prefixed(
        &mut self,
        prefix: Option<&str>,
        local: &str,
        uri: &str,
    ) -> Result<()> {
        trace!("write_empty_element_prefixed: {:?}:{} ('{}')", prefix, local, uri);
        self.begin_start_element(local)?;
        let name = self.verbatim_element_name(prefix, local)?;
        self.write_start_tag(name, true)
    }

    pub fn write_end_element(&mut self) -> Result<()> {
        trace!("write_end_element");
        if let Step::CloseStartTag { empty } = self.state.step(Call::EndElement)? {
            if self.close_start_tag_for_end(empty)? {
                return Ok(());
            }
        }

        let scope = self.elements.pop().ok_or(WriterError::NoOpenElement)?;
        if let Some(name) = scope.name() {
            self.sink.write_end_tag(name)?;
        }
        self.after_element_closed();
        Ok(())
    }

    /*
     * Attributes
     */

    fn emit_attribute(&mut self, name: QName, value: AttributeValue<'_>) -> Result<()> {
        if self.settings.should_check_names() {
            verify_qualified(name.prefix(), name.local_name())?;
        }
        if self.settings.should_check_attributes() && !self.elements.note_attribute(&name) {
            return Err(WriterError::DuplicateAttribute {
                name: name.to_string(),
            });
        }
        match value {
            AttributeValue::Text(value) => self.sink.write_attribute(&name, value),
            AttributeValue::Typed(encoder) => self.sink.write_typed_attribute(&name, encoder),
        }
    }

    /// Attribute in no namespace.
    pub fn write_attribute_local(&mut self, local: &str, value: &str) -> Result<()> {
        trace!("write_attribute_local: {}", local);
        self.begin(Call::Attribute)?;
        let name = self.symbols.find_symbol(local);
        self.emit_attribute(name, AttributeValue::Text(value))
    }

    /// Attribute whose prefix is looked up from `uri`. Only explicit bindings
    /// qualify; an empty `uri` means no namespace.
    pub fn write_attribute(&mut self, uri: &str, local: &str, value: &str) -> Result<()> {
        trace!("write_attribute: {{{}}}{}", uri, local);
        self.begin(Call::Attribute)?;
        let name = if uri.is_empty() {
            self.symbols.find_symbol(local)
        } else {
            let root = self.root_ns_context.as_deref();
            match self.elements.get_explicit_prefix(uri, root) {
                Some(prefix) => self.symbols.find_prefixed_symbol(prefix, local),
                None => return Err(WriterError::unbound(uri)),
            }
        };
        self.emit_attribute(name, AttributeValue::Text(value))
    }

    /// Attribute with a caller-chosen prefix; `uri` is not consulted.
    pub fn write_attribute_prefixed(
        &mut self,
        prefix: Option<&str>,
        uri: &str,
        local: &str,
        value: &str,
    ) -> Result<()> {
        trace!("write_attribute_prefixed: {:?}:{} ('{}')", prefix, local, uri);
        self.begin(Call::Attribute)?;
        let name = self.symbols.find(prefix, local);
        self.emit_attribute(name, AttributeValue::Text(value))
    }

    /// Attribute whose value is produced by `encoder`. Name resolution is the
    /// same as [`Self::write_attribute_prefixed`].
    pub fn write_typed_attribute(
        &mut self,
        prefix: Option<&str>,
        uri: &str,
        local: &str,
        encoder: &dyn ValueEncoder,
    ) -> Result<()> {
        trace!("write_typed_attribute: {:?}:{} ('{}')", prefix, local, uri);
        self.begin(Call::Attribute)?;
        let name = self.symbols.find(prefix, local);
        self.emit_attribute(name, AttributeValue::Typed(encoder))
    }

    pub fn write_int_attribute(
        &mut self,
        prefix: Option<&str>,
        uri: &str,
        local: &str,
        value: i64,
    ) -> Result<()> {
        self.write_typed_attribute(prefix, uri, local, &TypedValue::Int(value))
    }

    pub fn write_bool_attribute(
        &mut self,
        prefix: Option<&str>,
        uri: &str,
        local: &str,
        value: bool,
    ) -> Result<()> {
        self.write_typed_attribute(prefix, uri, local, &TypedValue::Bool(value))
    }

    pub fn write_float_attribute(
        &mut self,
        prefix: Option<&str>,
        uri: &str,
        local: &str,
        value: f64,
    ) -> Result<()> {
        self.write_typed_attribute(prefix, uri, local, &TypedValue::Float(value))
    }

    /// Attribute whose value is the serialized form of `value`.
    pub fn write_qname_attribute(
        &mut self,
        prefix: Option<&str>,
        uri: &str,
        local: &str,
        value: &QName,
    ) -> Result<()> {
        let text = value.serialize();
        self.write_attribute_prefixed(prefix, uri, local, &text)
    }

    /*
     * Namespace declarations and bindings
     */

    /// Emits the declaration and binds it on the current element.
    fn declare_and_bind(&mut self, binding: Binding<'_>) -> Result<()> {
        self.begin(Call::Namespace)?;
        match binding {
            Binding::Default(uri) => {
                debug!("declaring default namespace '{}'", uri);
                check_default_binding(uri)?;
                self.sink.write_default_namespace(uri)?;
                self.set_default_namespace(uri)?;
            }
            Binding::Prefixed(prefix, uri) => {
                debug!("declaring prefix `{}` for '{}'", prefix, uri);
                if self.settings.should_check_names() {
                    verify_ncname(prefix)?;
                }
                check_binding(prefix, uri)?;
                self.sink.write_namespace(prefix, uri)?;
                self.set_prefix(Some(prefix), uri)?;
            }
        }
        Ok(())
    }

    /// Declares `prefix` for `uri` on the open start tag. A missing or empty
    /// prefix declares the default namespace instead.
    pub fn write_namespace(&mut self, prefix: Option<&str>, uri: &str) -> Result<()> {
        trace!("write_namespace: {:?} '{}'", prefix, uri);
        match prefix {
            None | Some("") => self.write_default_namespace(uri),
            Some(prefix) => self.declare_and_bind(Binding::Prefixed(prefix, uri)),
        }
    }

    pub fn write_default_namespace(&mut self, uri: &str) -> Result<()> {
        trace!("write_default_namespace: '{}'", uri);
        self.declare_and_bind(Binding::Default(uri))
    }

    /// Binds the default namespace on the current element without writing anything.
    pub fn set_default_namespace(&mut self, uri: &str) -> Result<()> {
        check_default_binding(uri)?;
        self.elements.set_default_ns_uri(uri);
        Ok(())
    }

    /// Binds `prefix` on the current element without writing anything. A
    /// missing or empty prefix binds the default namespace.
    pub fn set_prefix(&mut self, prefix: Option<&str>, uri: &str) -> Result<()> {
        let prefix = match prefix {
            None | Some("") => return self.set_default_namespace(uri),
            Some(prefix) => prefix,
        };
        // `xml` is always bound; re-binding it to its own URI is a no-op.
        if prefix == XML_NS_PREFIX && uri == XML_NS_URI {
            return Ok(());
        }
        check_binding(prefix, uri)?;
        self.bind_prefix(prefix, uri);
        Ok(())
    }

    fn bind_prefix(&mut self, prefix: &str, uri: &str) {
        self.elements.add_prefix(prefix, uri);
    }

    /*
     * Content
     */

    pub fn write_characters(&mut self, text: &str) -> Result<()> {
        trace!("write_characters");
        let whitespace_only = text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
        self.begin_content("character", whitespace_only)?;
        self.sink.write_characters(text)?;
        self.after_content();
        Ok(())
    }

    pub fn write_typed_characters(&mut self, encoder: &dyn ValueEncoder) -> Result<()> {
        trace!("write_typed_characters");
        self.begin_content("character", false)?;
        self.sink.write_typed_characters(encoder)?;
        self.after_content();
        Ok(())
    }

    /// Writes the serialized form of `name` as character content.
    pub fn write_qname(&mut self, name: &QName) -> Result<()> {
        trace!("write_qname: {}", name);
        self.begin_content("character", false)?;
        self.sink.write_characters(&name.serialize())?;
        self.after_content();
        Ok(())
    }

    pub fn write_cdata(&mut self, data: &str) -> Result<()> {
        trace!("write_cdata");
        self.begin_content("CDATA", false)?;
        self.sink.write_cdata(data)?;
        self.after_content();
        Ok(())
    }

    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        trace!("write_comment");
        self.begin_content("comment", true)?;
        self.sink.write_comment(text)?;
        self.after_content();
        Ok(())
    }

    pub fn write_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Result<()> {
        trace!("write_processing_instruction: {}", target);
        self.begin_content("processing instruction", true)?;
        if self.settings.should_check_names() {
            verify_ncname(target)?;
        }
        self.sink.write_processing_instruction(target, data)?;
        self.after_content();
        Ok(())
    }

    pub fn write_entity_ref(&mut self, name: &str) -> Result<()> {
        trace!("write_entity_ref: {}", name);
        self.begin_content("entity reference", false)?;
        if self.settings.should_check_names() {
            verify_ncname(name)?;
        }
        self.sink.write_entity_ref(name)?;
        self.after_content();
        Ok(())
    }
}

fn check_default_binding(uri: &str) -> Result<()> {
    if is_legal_default_binding(uri) {
        Ok(())
    } else {
        Err(WriterError::ReservedPrefix {
            prefix: String::new(),
            uri: uri.to_owned(),
        })
    }
}

fn check_binding(prefix: &str, uri: &str) -> Result<()> {
    if is_legal_binding(prefix, uri) {
        Ok(())
    } else {
        Err(WriterError::ReservedPrefix {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensure_env_logger_initialized;
    use crate::namespace::{SimpleNamespaceContext, XMLNS_ATTRIBUTE_NS_URI};
    use crate::sink::{RecordingSink, SinkEvent, XmlByteSink};
    use pretty_assertions::assert_eq;

    fn xml_writer() -> NonRepairingWriter<XmlByteSink<Vec<u8>>> {
        ensure_env_logger_initialized();
        NonRepairingWriter::new(XmlByteSink::new(Vec::new()))
    }

    fn output(writer: NonRepairingWriter<XmlByteSink<Vec<u8>>>) -> String {
        String::from_utf8(writer.into_sink().into_inner()).expect("output is utf-8")
    }

    #[test]
    fn test_attribute_without_start_tag_fails() {
        let mut writer = xml_writer();
        assert!(matches!(
            writer.write_attribute("", "id", "5"),
            Err(WriterError::AttributeWithoutStartTag)
        ));

        writer.write_start_element_local("root").unwrap();
        writer.write_characters("text").unwrap();
        assert!(matches!(
            writer.write_attribute_local("id", "5"),
            Err(WriterError::AttributeWithoutStartTag)
        ));
        assert!(matches!(
            writer.write_typed_attribute(None, "", "n", &TypedValue::Int(1)),
            Err(WriterError::AttributeWithoutStartTag)
        ));
    }

    #[test]
    fn test_namespace_without_start_tag_fails() {
        let mut writer = xml_writer();
        for prefix in [None, Some(""), Some("p")] {
            assert!(matches!(
                writer.write_namespace(prefix, "urn:x"),
                Err(WriterError::NamespaceWithoutStartTag)
            ));
        }
        assert!(matches!(
            writer.write_default_namespace("urn:x"),
            Err(WriterError::NamespaceWithoutStartTag)
        ));
    }

    #[test]
    fn test_no_namespace_attribute() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_attribute("", "id", "5").unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(output(writer), "<e id=\"5\"/>");
    }

    #[test]
    fn test_unbound_element_namespace_fails() {
        let mut writer = xml_writer();
        let err = writer
            .write_start_element("urn:unbound", "x")
            .expect_err("unbound uri");
        assert_eq!(err.to_string(), "Unbound namespace URI 'urn:unbound'");

        let mut writer = xml_writer();
        assert!(matches!(
            writer.write_empty_element("urn:unbound", "x"),
            Err(WriterError::UnboundNamespace { .. })
        ));
    }

    #[test]
    fn test_unbound_attribute_namespace_fails() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        assert!(matches!(
            writer.write_attribute("urn:unbound", "a", "v"),
            Err(WriterError::UnboundNamespace { uri }) if uri == "urn:unbound"
        ));
    }

    #[test]
    fn test_attribute_ignores_default_namespace() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_default_namespace("urn:d").unwrap();

        assert!(matches!(
            writer.write_attribute("urn:d", "a", "v"),
            Err(WriterError::UnboundNamespace { .. })
        ));
    }

    #[test]
    fn test_declared_prefix_resolves_on_same_element() {
        let mut writer = xml_writer();
        writer.write_start_element_local("root").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();
        writer.write_attribute("urn:x", "a", "1").unwrap();
        writer
            .write_start_element_prefixed(Some("p"), "child", "urn:x")
            .unwrap();
        writer.write_empty_element("urn:x", "leaf").unwrap();
        writer.write_end_document().unwrap();

        assert_eq!(
            output(writer),
            "<root xmlns:p=\"urn:x\" p:a=\"1\"><p:child><p:leaf/></p:child></root>"
        );
    }

    #[test]
    fn test_default_namespace_resolves_to_unprefixed_name() {
        let mut writer = NonRepairingWriter::new(RecordingSink::new());
        writer.write_start_element_local("root").unwrap();
        writer.write_default_namespace("urn:d").unwrap();
        writer.write_start_element("urn:d", "e").unwrap();

        let events = writer.into_sink().into_events();
        match events.last() {
            Some(SinkEvent::StartTag(name)) => {
                assert_eq!(name.prefix(), None);
                assert_eq!(name.local_name(), "e");
            }
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn test_namespace_with_empty_prefix_is_default_namespace() {
        let mut outputs = Vec::new();
        for prefix in [None, Some("")] {
            let mut writer = xml_writer();
            writer.write_start_element_local("e").unwrap();
            writer.write_namespace(prefix, "urn:d").unwrap();
            assert_eq!(writer.get_prefix("urn:d"), Some(""));
            outputs.push(output(writer));
        }

        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_default_namespace("urn:d").unwrap();
        outputs.push(output(writer));

        assert_eq!(outputs[0], "<e xmlns=\"urn:d\"");
        assert!(outputs.iter().all(|o| *o == outputs[0]));
    }

    #[test]
    fn test_redeclaring_binds_again() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();

        let bindings: Vec<_> = writer.element_stack().current().bindings().collect();
        assert_eq!(bindings, vec![("p", "urn:x"), ("p", "urn:x")]);
        assert_eq!(writer.get_prefix("urn:x"), Some("p"));
    }

    #[test]
    fn test_set_prefix_binds_without_output() {
        let mut writer = NonRepairingWriter::new(RecordingSink::new());
        writer.set_prefix(Some("p"), "urn:x").unwrap();
        writer.set_default_namespace("urn:d").unwrap();
        writer.write_start_element("urn:x", "a").unwrap();
        writer.write_empty_element("urn:d", "b").unwrap();
        writer.write_end_document().unwrap();

        let events = writer.into_sink().into_events();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, SinkEvent::Namespace(..) | SinkEvent::DefaultNamespace(_)))
        );
        let names: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::StartTag(name) => Some(name.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["p:a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn test_reserved_prefixes() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();

        assert!(writer.set_prefix(Some("xml"), XML_NS_URI).is_ok());
        assert!(matches!(
            writer.write_namespace(Some("xml"), "urn:other"),
            Err(WriterError::ReservedPrefix { .. })
        ));
        assert!(matches!(
            writer.write_namespace(Some("xmlns"), "urn:other"),
            Err(WriterError::ReservedPrefix { .. })
        ));
        assert!(matches!(
            writer.set_prefix(Some("p"), XML_NS_URI),
            Err(WriterError::ReservedPrefix { .. })
        ));

        writer.write_attribute(XML_NS_URI, "lang", "en").unwrap();
        assert_eq!(output(writer), "<e xml:lang=\"en\"");
    }

    #[test]
    fn test_default_namespace_rejects_reserved_uris() {
        let mut writer = xml_writer();
        writer.write_start_element_local("r").unwrap();
        for uri in [XML_NS_URI, XMLNS_ATTRIBUTE_NS_URI] {
            assert!(matches!(
                writer.write_default_namespace(uri),
                Err(WriterError::ReservedPrefix { prefix, .. }) if prefix.is_empty()
            ));
            assert!(matches!(
                writer.write_namespace(None, uri),
                Err(WriterError::ReservedPrefix { .. })
            ));
            assert!(matches!(
                writer.set_default_namespace(uri),
                Err(WriterError::ReservedPrefix { .. })
            ));
            assert!(matches!(
                writer.set_prefix(Some(""), uri),
                Err(WriterError::ReservedPrefix { .. })
            ));
        }
        assert_eq!(writer.get_prefix(XML_NS_URI), Some(XML_NS_PREFIX));

        writer.write_start_element("", "child").unwrap();
        assert_eq!(output(writer), "<r><child");
    }

    #[test]
    fn test_attribute_in_xmlns_namespace_fails() {
        let mut writer = xml_writer();
        writer.write_start_element_local("r").unwrap();
        assert!(matches!(
            writer.write_attribute(XMLNS_ATTRIBUTE_NS_URI, "p", "urn:sneak"),
            Err(WriterError::UnboundNamespace { .. })
        ));
        assert!(matches!(
            writer.write_start_element(XMLNS_ATTRIBUTE_NS_URI, "p"),
            Err(WriterError::UnboundNamespace { .. })
        ));
        assert_eq!(writer.get_namespace_uri("p"), None);
    }

    #[test]
    fn test_namespace_after_content_fails() {
        let mut writer = xml_writer();
        writer.write_start_element_local("root").unwrap();
        writer.write_characters("text").unwrap();
        for prefix in [None, Some("p")] {
            assert!(matches!(
                writer.write_namespace(prefix, "urn:x"),
                Err(WriterError::NamespaceWithoutStartTag)
            ));
        }
        assert!(matches!(
            writer.write_default_namespace("urn:x"),
            Err(WriterError::NamespaceWithoutStartTag)
        ));
        assert_eq!(writer.get_prefix("urn:x"), None);
    }

    #[test]
    fn test_namespace_after_root_closed_fails() {
        let mut writer = xml_writer();
        writer.write_empty_element_local("root").unwrap();
        writer.write_characters("\n").unwrap();
        assert!(matches!(
            writer.write_namespace(Some("p"), "urn:x"),
            Err(WriterError::NamespaceWithoutStartTag)
        ));
        assert!(matches!(
            writer.write_default_namespace("urn:x"),
            Err(WriterError::NamespaceWithoutStartTag)
        ));
        assert_eq!(output(writer), "<root/>\n");
    }

    #[test]
    fn test_interned_names_shared_across_calls() {
        let mut writer = NonRepairingWriter::new(RecordingSink::new());
        writer.write_start_element_local("root").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();
        writer.write_empty_element("urn:x", "item").unwrap();
        writer
            .write_empty_element_prefixed(Some("p"), "item", "urn:x")
            .unwrap();

        let events = writer.into_sink().into_events();
        let items: Vec<&QName> = events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::StartTag(name) if name.local_name() == "item" => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].ptr_eq(items[1]));
    }

    #[test]
    fn test_automatic_empty_elements() {
        let mut writer = xml_writer();
        writer.write_start_element_local("a").unwrap();
        writer.write_start_element_local("b").unwrap();
        writer.write_end_element().unwrap();
        writer.write_end_element().unwrap();
        assert_eq!(output(writer), "<a><b/></a>");

        let mut writer = NonRepairingWriter::with_settings(
            XmlByteSink::new(Vec::new()),
            WriterSettings::new().automatic_empty_elements(false),
        );
        writer.write_start_element_local("a").unwrap();
        writer.write_end_element().unwrap();
        assert_eq!(output(writer), "<a></a>");
    }

    #[test]
    fn test_empty_element_end_closes_parent() {
        let mut writer = xml_writer();
        writer.write_start_element_local("a").unwrap();
        writer.write_empty_element_local("b").unwrap();
        writer.write_attribute_local("x", "1").unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(writer.depth(), 0);
        assert_eq!(writer.state(), WriterState::NoOpenElement);
        assert_eq!(output(writer), "<a><b x=\"1\"/></a>");
    }

    #[test]
    fn test_end_element_without_open_element() {
        let mut writer = xml_writer();
        assert!(matches!(
            writer.write_end_element(),
            Err(WriterError::NoOpenElement)
        ));
    }

    #[test]
    fn test_second_root_element() {
        let mut writer = xml_writer();
        writer.write_empty_element_local("a").unwrap();
        assert!(matches!(
            writer.write_start_element_local("b"),
            Err(WriterError::SecondRootElement { name }) if name == "b"
        ));

        let mut writer = NonRepairingWriter::with_settings(
            XmlByteSink::new(Vec::new()),
            WriterSettings::new().check_structure(false),
        );
        writer.write_empty_element_local("a").unwrap();
        writer.write_empty_element_local("b").unwrap();
        writer.write_end_document().unwrap();
        assert_eq!(output(writer), "<a/><b/>");
    }

    #[test]
    fn test_duplicate_attributes() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();
        writer.write_attribute("urn:x", "a", "1").unwrap();
        writer.write_attribute("", "a", "2").unwrap();
        assert!(matches!(
            writer.write_attribute_prefixed(Some("p"), "urn:x", "a", "3"),
            Err(WriterError::DuplicateAttribute { name }) if name == "p:a"
        ));
    }

    #[test]
    fn test_name_checks() {
        let mut writer = NonRepairingWriter::with_settings(
            XmlByteSink::new(Vec::new()),
            WriterSettings::new().check_names(true),
        );
        assert!(matches!(
            writer.write_start_element_prefixed(Some("p"), "1bad", "urn:x"),
            Err(WriterError::InvalidName { .. })
        ));

        let mut writer = NonRepairingWriter::with_settings(
            XmlByteSink::new(Vec::new()),
            WriterSettings::new().check_names(true),
        );
        writer.write_start_element_local("e").unwrap();
        assert!(matches!(
            writer.write_namespace(Some("a b"), "urn:x"),
            Err(WriterError::InvalidName { .. })
        ));
        assert!(matches!(
            writer.write_attribute_local("x y", "v"),
            Err(WriterError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_declaration_only_first() {
        let mut writer = xml_writer();
        writer.write_start_document().unwrap();
        assert!(matches!(
            writer.write_start_document(),
            Err(WriterError::MisplacedDeclaration)
        ));
        writer.write_empty_element_local("e").unwrap();
        writer.write_end_document().unwrap();

        assert_eq!(
            output(writer),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><e/>"
        );
    }

    #[test]
    fn test_end_document_closes_everything() {
        let mut writer = xml_writer();
        writer.write_start_element_local("a").unwrap();
        writer.write_start_element_local("b").unwrap();
        writer.write_characters("t").unwrap();
        writer.write_start_element_local("c").unwrap();
        writer.write_end_document().unwrap();

        assert_eq!(writer.state(), WriterState::Ended);
        assert!(matches!(
            writer.write_comment("late"),
            Err(WriterError::DocumentEnded)
        ));
        assert_eq!(output(writer), "<a><b>t<c/></b></a>");
    }

    #[test]
    fn test_text_outside_root() {
        let mut writer = xml_writer();
        writer.write_comment(" prolog ").unwrap();
        writer.write_characters("\n").unwrap();
        assert!(matches!(
            writer.write_characters("text"),
            Err(WriterError::InvalidContent { .. })
        ));
        assert!(matches!(
            writer.write_cdata("data"),
            Err(WriterError::InvalidContent { what: "CDATA", .. })
        ));
        assert!(matches!(
            writer.write_entity_ref("amp"),
            Err(WriterError::InvalidContent { what: "entity reference", .. })
        ));
    }

    #[test]
    fn test_root_namespace_context() {
        let root = SimpleNamespaceContext::new().bind("r", "urn:root");
        let mut writer = xml_writer().with_root_namespace_context(root);

        writer.write_start_element("urn:root", "doc").unwrap();
        writer.write_attribute("urn:root", "a", "1").unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(output(writer), "<r:doc r:a=\"1\"/>");
    }

    #[test]
    fn test_typed_content_and_qnames() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();
        writer.write_int_attribute(None, "", "n", -3).unwrap();
        writer.write_bool_attribute(Some("p"), "urn:x", "ok", true).unwrap();
        let type_name = writer.intern(Some("p"), "kind");
        writer
            .write_qname_attribute(None, "", "type", &type_name)
            .unwrap();
        writer.write_typed_characters(&TypedValue::UInt(42)).unwrap();
        writer.write_qname(&type_name).unwrap();
        writer.write_end_document().unwrap();

        assert_eq!(
            output(writer),
            "<e xmlns:p=\"urn:x\" n=\"-3\" p:ok=\"true\" type=\"p:kind\">42p:kind</e>"
        );
    }

    #[test]
    fn test_get_namespace_uri() {
        let mut writer = xml_writer();
        writer.write_start_element_local("e").unwrap();
        writer.write_namespace(Some("p"), "urn:x").unwrap();

        assert_eq!(writer.get_namespace_uri("p"), Some("urn:x"));
        assert_eq!(writer.get_namespace_uri(""), Some(""));
        assert_eq!(writer.get_namespace_uri("q"), None);
    }
}
