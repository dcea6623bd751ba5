//! XML name syntax checks (XML 1.0 fifth edition, productions 4 and 4a,
//! restricted to NCNames by Namespaces in XML).

use crate::err::{Result, WriterError};

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Reason `name` is not a legal NCName, if any.
pub fn ncname_error(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => Some("name is empty"),
        Some(':') => Some("colons are not allowed in local names or prefixes"),
        Some(c) if !is_name_start_char(c) => Some("illegal first character"),
        Some(_) => {
            for c in chars {
                if c == ':' {
                    return Some("colons are not allowed in local names or prefixes");
                }
                if !is_name_char(c) {
                    return Some("illegal name character");
                }
            }
            None
        }
    }
}

pub fn verify_ncname(name: &str) -> Result<()> {
    match ncname_error(name) {
        Some(reason) => Err(WriterError::InvalidName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Verifies an optional prefix plus local name; an empty prefix is treated as absent.
pub fn verify_qualified(prefix: Option<&str>, local: &str) -> Result<()> {
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        verify_ncname(prefix)?;
    }
    verify_ncname(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_legal_names() {
        for name in ["a", "_x", "élément", "a-b.c_1", "名前", "x\u{B7}y"] {
            assert_eq!(ncname_error(name), None, "{} should be legal", name);
        }
    }

    #[test]
    fn test_rejects_illegal_names() {
        assert_eq!(ncname_error(""), Some("name is empty"));
        assert_eq!(ncname_error("1abc"), Some("illegal first character"));
        assert_eq!(ncname_error("-a"), Some("illegal first character"));
        assert_eq!(ncname_error("a b"), Some("illegal name character"));
        assert!(ncname_error("p:x").is_some());
        assert!(ncname_error(":x").is_some());
    }

    #[test]
    fn test_verify_qualified_checks_both_parts() {
        assert!(verify_qualified(Some("p"), "x").is_ok());
        assert!(verify_qualified(Some(""), "x").is_ok());
        assert!(matches!(
            verify_qualified(Some("1p"), "x"),
            Err(WriterError::InvalidName { .. })
        ));
        assert!(verify_qualified(None, "x y").is_err());
    }
}
