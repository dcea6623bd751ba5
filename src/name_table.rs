use crate::qname::QName;

use ahash::RandomState;
use hashbrown::{Equivalent, HashMap};
use log::trace;

/// Owned lookup key. An absent prefix is stored as `""`.
#[derive(Debug, PartialEq, Eq, Hash)]
struct NameKey {
    prefix: Box<str>,
    local: Box<str>,
}

/// Borrowed form of [`NameKey`], hashes identically so lookups don't allocate.
#[derive(Hash)]
struct NameKeyRef<'a> {
    prefix: &'a str,
    local: &'a str,
}

impl Equivalent<NameKey> for NameKeyRef<'_> {
    fn equivalent(&self, key: &NameKey) -> bool {
        *self.prefix == *key.prefix && *self.local == *key.local
    }
}

/// Session-scoped symbol table for qualified names.
///
/// Repeated lookups with equal `(prefix, local)` content return clones of the
/// same [`QName`] handle. The table owns every name it hands out; handles stay
/// valid for as long as anyone holds them.
#[derive(Debug)]
pub struct NameTable {
    names: HashMap<NameKey, QName, RandomState>,
}

impl Default for NameTable {
    fn default() -> Self {
        NameTable {
            names: HashMap::with_hasher(RandomState::new()),
        }
    }
}

impl NameTable {
    pub fn new() -> Self {
        NameTable::default()
    }

    /// Interned name without a prefix.
    pub fn find_symbol(&mut self, local: &str) -> QName {
        self.find_prefixed_symbol("", local)
    }

    /// Interned name with `prefix`. An empty prefix is the same as no prefix.
    pub fn find_prefixed_symbol(&mut self, prefix: &str, local: &str) -> QName {
        let lookup = NameKeyRef { prefix, local };
        if let Some(name) = self.names.get(&lookup) {
            return name.clone();
        }

        trace!("interning new name `{}` (prefix `{}`)", local, prefix);
        let name = QName::from_parts(Some(prefix), local);
        self.names.insert(
            NameKey {
                prefix: Box::from(prefix),
                local: Box::from(local),
            },
            name.clone(),
        );
        name
    }

    /// Interned name for an optional prefix.
    pub fn find(&mut self, prefix: Option<&str>, local: &str) -> QName {
        self.find_prefixed_symbol(prefix.unwrap_or(""), local)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
