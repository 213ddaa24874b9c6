//! crates/logging/src/name.rs
//! Logger names stored as prefixes of a shared string.
//!
//! Looking up `a:b:c` may create `a` and `a:b` as well. All three nodes keep
//! an `Arc` of the one string `"a:b:c"` plus their own length, so implicit
//! ancestors cost no extra name allocation however deep the name is.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A logger name: the first `len` bytes of `source`.
///
/// Hashes and compares exactly like the `str` it derefs to, so maps keyed by
/// `LoggerName` can be queried with a plain `&str`.
#[derive(Clone)]
pub(crate) struct LoggerName {
    source: Arc<str>,
    len: usize,
}

impl LoggerName {
    /// The prefix of `source` ending at byte `len`, which must be a char boundary.
    pub(crate) fn prefix(source: &Arc<str>, len: usize) -> Self {
        debug_assert!(source.is_char_boundary(len));
        Self {
            source: Arc::clone(source),
            len,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.source[..self.len]
    }
}

impl From<&str> for LoggerName {
    fn from(name: &str) -> Self {
        Self {
            source: Arc::from(name),
            len: name.len(),
        }
    }
}

impl Borrow<str> for LoggerName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Hash for LoggerName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialEq for LoggerName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for LoggerName {}

impl fmt::Debug for LoggerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn prefixes_share_one_allocation() {
        let source: Arc<str> = Arc::from("a:b:c");
        let parent = LoggerName::prefix(&source, 3);
        let leaf = LoggerName::prefix(&source, 5);

        assert_eq!(parent.as_str(), "a:b");
        assert_eq!(leaf.as_str(), "a:b:c");
        assert_eq!(Arc::strong_count(&source), 3);
    }

    #[test]
    fn map_lookup_by_str() {
        let source: Arc<str> = Arc::from("x:y");
        let mut map = HashMap::new();
        map.insert(LoggerName::prefix(&source, 1), 1);
        map.insert(LoggerName::from("x:y"), 2);

        assert_eq!(map.get("x"), Some(&1));
        assert_eq!(map.get("x:y"), Some(&2));
        assert_eq!(map.get("x:"), None);
    }

    #[test]
    fn equality_ignores_backing_string() {
        let long: Arc<str> = Arc::from("net:http");
        assert_eq!(LoggerName::prefix(&long, 3), LoggerName::from("net"));
        assert_eq!(format!("{:?}", LoggerName::from("")), "\"\"");
    }
}
