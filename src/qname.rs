//! Interned qualified names.
//!
//! A [`QName`] is a cheap, shared handle to an immutable `(prefix, local)`
//! pair owned by a [`NameTable`](crate::NameTable). Two handles obtained from
//! the same table for equal content point to the same allocation, so equality
//! and hashing are by identity rather than by string comparison.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug)]
pub(crate) struct QNameData {
    pub(crate) prefix: Option<Box<str>>,
    pub(crate) local: Box<str>,
}

/// A qualified name: optional prefix plus required local name.
#[derive(Clone)]
pub struct QName {
    inner: Rc<QNameData>,
}

impl QName {
    pub(crate) fn from_parts(prefix: Option<&str>, local: &str) -> Self {
        QName {
            inner: Rc::new(QNameData {
                prefix: prefix.filter(|p| !p.is_empty()).map(Box::from),
                local: Box::from(local),
            }),
        }
    }

    /// The prefix, `None` when the name is unprefixed.
    pub fn prefix(&self) -> Option<&str> {
        self.inner.prefix.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.inner.local
    }

    pub fn has_prefix(&self) -> bool {
        self.inner.prefix.is_some()
    }

    /// True if both handles refer to the same interned instance.
    pub fn ptr_eq(&self, other: &QName) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Textual form, `prefix:local` or just `local`.
    pub fn serialize(&self) -> Cow<'_, str> {
        serialize_qname(self.prefix(), self.local_name())
    }

    /// Length of the serialized form in bytes.
    pub fn serialized_len(&self) -> usize {
        match self.prefix() {
            Some(prefix) => prefix.len() + 1 + self.local_name().len(),
            None => self.local_name().len(),
        }
    }
}

/// Serializes a qualified name. No escaping is applied; names are
/// expected to be valid XML names already.
pub fn serialize_qname<'a>(prefix: Option<&str>, local: &'a str) -> Cow<'a, str> {
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            let mut s = String::with_capacity(prefix.len() + 1 + local.len());
            s.push_str(prefix);
            s.push(':');
            s.push_str(local);
            Cow::Owned(s)
        }
        _ => Cow::Borrowed(local),
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.inner), state)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix() {
            write!(f, "{}:{}", prefix, self.local_name())
        } else {
            f.write_str(self.local_name())
        }
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QName").field(&self.serialize()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_prefixed_name() {
        assert_eq!(serialize_qname(Some("p"), "x"), "p:x");
        assert_eq!(QName::from_parts(Some("p"), "x").to_string(), "p:x");
    }

    #[test]
    fn test_empty_prefix_serializes_as_local() {
        assert_eq!(serialize_qname(Some(""), "x"), "x");
        assert_eq!(serialize_qname(None, "x"), "x");

        let name = QName::from_parts(Some(""), "x");
        assert!(!name.has_prefix());
        assert_eq!(name.serialize(), "x");
        assert_eq!(name.serialized_len(), 1);
    }

    #[test]
    fn test_equality_is_identity() {
        let a = QName::from_parts(Some("p"), "x");
        let b = QName::from_parts(Some("p"), "x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert!(a.ptr_eq(&a.clone()));
    }
}
