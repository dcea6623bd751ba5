//! Namespace contexts and predefined bindings.

pub const XML_NS_PREFIX: &str = "xml";
pub const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_ATTRIBUTE: &str = "xmlns";
pub const XMLNS_ATTRIBUTE_NS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Read-only prefix <-> URI lookups.
///
/// An empty prefix denotes the default namespace.
pub trait NamespaceContext {
    fn namespace_uri(&self, prefix: &str) -> Option<&str>;
    fn prefix(&self, uri: &str) -> Option<&str>;
}

/// Predefined binding for `prefix`, if it is one of the two reserved prefixes.
pub(crate) fn predefined_uri(prefix: &str) -> Option<&'static str> {
    match prefix {
        XML_NS_PREFIX => Some(XML_NS_URI),
        XMLNS_ATTRIBUTE => Some(XMLNS_ATTRIBUTE_NS_URI),
        _ => None,
    }
}

pub(crate) fn predefined_prefix(uri: &str) -> Option<&'static str> {
    match uri {
        XML_NS_URI => Some(XML_NS_PREFIX),
        XMLNS_ATTRIBUTE_NS_URI => Some(XMLNS_ATTRIBUTE),
        _ => None,
    }
}

/// Checks that binding `prefix` to `uri` does not violate the rules for
/// `xml` and `xmlns` (Namespaces in XML, section 3).
pub(crate) fn is_legal_binding(prefix: &str, uri: &str) -> bool {
    match prefix {
        XML_NS_PREFIX => uri == XML_NS_URI,
        XMLNS_ATTRIBUTE => false,
        _ => uri != XML_NS_URI && uri != XMLNS_ATTRIBUTE_NS_URI,
    }
}

/// The default namespace may be bound to anything but the `xml` and `xmlns`
/// namespace URIs.
pub(crate) fn is_legal_default_binding(uri: &str) -> bool {
    uri != XML_NS_URI && uri != XMLNS_ATTRIBUTE_NS_URI
}

/// A plain, insertion-ordered namespace context.
///
/// Typically installed as the document-root context of a writer, so that
/// bindings inherited from an enclosing document resolve without being
/// re-declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleNamespaceContext {
    bindings: Vec<(String, String)>,
}

impl SimpleNamespaceContext {
    pub fn new() -> Self {
        SimpleNamespaceContext::default()
    }

    /// Adds a binding, replacing any earlier binding of the same prefix.
    pub fn bind(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let uri = uri.into();
        if let Some(existing) = self.bindings.iter_mut().find(|(p, _)| *p == prefix) {
            existing.1 = uri;
        } else {
            self.bindings.push((prefix, uri));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl NamespaceContext for SimpleNamespaceContext {
    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        if let Some(uri) = predefined_uri(prefix) {
            return Some(uri);
        }
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn prefix(&self, uri: &str) -> Option<&str> {
        if let Some(prefix) = predefined_prefix(uri) {
            return Some(prefix);
        }
        self.bindings
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(prefix, _)| prefix.as_str())
    }
}
