//! Per-element namespace scopes.
//!
//! The stack always holds a document-level scope at the bottom, so bindings
//! made before the root element is opened (via `set_prefix` and friends) are
//! inherited by the root. Scopes reference their parent implicitly by position.
//!
//! Lookup rules:
//! - [`ElementStack::get_prefix`] returns any visible binding, including the
//!   default namespace (as `""`). Used for element names.
//! - [`ElementStack::get_explicit_prefix`] never returns the default namespace.
//!   Used for attribute names, since unprefixed attributes are in no namespace.
//! - A binding in an outer scope is masked when an inner scope rebinds the
//!   same prefix to a different URI.
//! - When no default namespace was declared anywhere, the default namespace is
//!   the empty URI ("no namespace").

use crate::namespace::{
    NamespaceContext, XML_NS_PREFIX, XML_NS_URI, XMLNS_ATTRIBUTE_NS_URI, predefined_uri,
};
use crate::qname::QName;

use log::debug;

#[derive(Debug, Default)]
pub struct ElementScope {
    name: Option<QName>,
    bindings: Vec<(String, String)>,
    default_ns_uri: Option<String>,
    attributes: Vec<QName>,
}

impl ElementScope {
    fn new(name: QName) -> Self {
        ElementScope {
            name: Some(name),
            ..Default::default()
        }
    }

    /// Element name, `None` for the document scope.
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    /// Bindings declared on this element, in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn default_ns_uri(&self) -> Option<&str> {
        self.default_ns_uri.as_deref()
    }

    fn bound_uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

#[derive(Debug)]
pub struct ElementStack {
    scopes: Vec<ElementScope>,
}

impl Default for ElementStack {
    fn default() -> Self {
        ElementStack {
            scopes: vec![ElementScope::default()],
        }
    }
}

impl ElementStack {
    pub fn new() -> Self {
        ElementStack::default()
    }

    /// Number of open elements (the document scope is not counted).
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn is_at_document_level(&self) -> bool {
        self.scopes.len() == 1
    }

    pub fn current(&self) -> &ElementScope {
        // The document scope is never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut ElementScope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn push(&mut self, name: QName) {
        debug!("opening scope for `{}` at depth {}", name, self.depth() + 1);
        self.scopes.push(ElementScope::new(name));
    }

    /// Pops the innermost element scope. Returns `None` at document level.
    pub fn pop(&mut self) -> Option<ElementScope> {
        if self.is_at_document_level() {
            return None;
        }
        let scope = self.scopes.pop();
        if let Some(name) = scope.as_ref().and_then(ElementScope::name) {
            debug!("closing scope for `{}`", name);
        }
        scope
    }

    /// Adds an explicit binding to the current scope.
    pub fn add_prefix(&mut self, prefix: &str, uri: &str) {
        debug!("binding prefix `{}` to '{}'", prefix, uri);
        self.current_mut()
            .bindings
            .push((prefix.to_owned(), uri.to_owned()));
    }

    /// Sets the default namespace of the current scope.
    pub fn set_default_ns_uri(&mut self, uri: &str) {
        debug!("binding default namespace to '{}'", uri);
        self.current_mut().default_ns_uri = Some(uri.to_owned());
    }

    /// Records an attribute on the current start tag. Returns `false` if an
    /// attribute with the same interned name was already recorded.
    pub fn note_attribute(&mut self, name: &QName) -> bool {
        let attributes = &mut self.current_mut().attributes;
        if attributes.contains(name) {
            return false;
        }
        attributes.push(name.clone());
        true
    }

    fn declared_default(&self) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.default_ns_uri.as_deref())
    }

    /// Default namespace URI in effect, `""` when there is none.
    pub fn default_ns_uri<'a>(&'a self, root: Option<&'a dyn NamespaceContext>) -> &'a str {
        self.declared_default()
            .or_else(|| root.and_then(|ctx| ctx.namespace_uri("")))
            .unwrap_or("")
    }

    /// Any visible prefix for `uri`. `Some("")` means the default namespace.
    pub fn get_prefix<'a>(
        &'a self,
        uri: &str,
        root: Option<&'a dyn NamespaceContext>,
    ) -> Option<&'a str> {
        if uri == XMLNS_ATTRIBUTE_NS_URI {
            return None;
        }
        if self.default_ns_uri(root) == uri {
            return Some("");
        }
        self.get_explicit_prefix(uri, root)
    }

    /// An explicitly declared (non-default) prefix for `uri`, falling back to
    /// the document-root context. The `xmlns` namespace never resolves: names
    /// in it are namespace declarations, which only `write_namespace` emits.
    pub fn get_explicit_prefix<'a>(
        &'a self,
        uri: &str,
        root: Option<&'a dyn NamespaceContext>,
    ) -> Option<&'a str> {
        if uri == XMLNS_ATTRIBUTE_NS_URI {
            return None;
        }

        let mut seen: Vec<&str> = Vec::new();
        for scope in self.scopes.iter().rev() {
            for (prefix, bound) in scope.bindings.iter().rev() {
                let prefix = prefix.as_str();
                if seen.contains(&prefix) {
                    continue;
                }
                if bound == uri && !prefix.is_empty() {
                    return Some(prefix);
                }
                seen.push(prefix);
            }
        }

        if uri == XML_NS_URI {
            return Some(XML_NS_PREFIX);
        }

        root.and_then(|ctx| ctx.prefix(uri))
            .filter(|prefix| !prefix.is_empty() && !seen.contains(prefix))
    }

    /// URI bound to `prefix` in the current scope. `""` asks for the default namespace.
    pub fn get_namespace_uri<'a>(
        &'a self,
        prefix: &str,
        root: Option<&'a dyn NamespaceContext>,
    ) -> Option<&'a str> {
        if prefix.is_empty() {
            return Some(self.default_ns_uri(root));
        }
        if let Some(uri) = predefined_uri(prefix) {
            return Some(uri);
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bound_uri(prefix))
            .or_else(|| root.and_then(|ctx| ctx.namespace_uri(prefix)))
    }
}
