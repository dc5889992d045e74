//! Attribute keys
//!
//! An attribute is named either by a plain string or by a [`UniqueKey`], an
//! unforgeable token that only compares equal to its own clones. Unique keys
//! let components store attributes that user definitions can never collide
//! with (see [`path_key`]).

use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity-compared attribute key
///
/// Two keys created with the same label are still different keys.
///
/// # Examples
///
/// ```
/// use switchyard_router::UniqueKey;
///
/// let a = UniqueKey::new("session");
/// let b = UniqueKey::new("session");
///
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// ```
#[derive(Clone)]
pub struct UniqueKey {
    id: u64,
    label: Arc<str>,
}

impl UniqueKey {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
            label: Arc::from(label.as_ref()),
        }
    }

    /// Label used for debugging and error messages only
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for UniqueKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UniqueKey {}

impl Hash for UniqueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniqueKey({}#{})", self.label, self.id)
    }
}

/// Name of an attribute in an [`AttributeMap`](crate::AttributeMap)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Name(String),
    Unique(UniqueKey),
}

impl AttributeKey {
    /// The string name, if this is not a unique key
    pub fn as_name(&self) -> Option<&str> {
        match self {
            AttributeKey::Name(name) => Some(name),
            AttributeKey::Unique(_) => None,
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, AttributeKey::Unique(_))
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::Name(name) => f.write_str(name),
            AttributeKey::Unique(key) => write!(f, "[{}]", key.label()),
        }
    }
}

impl PartialEq<str> for AttributeKey {
    fn eq(&self, other: &str) -> bool {
        self.as_name() == Some(other)
    }
}

impl PartialEq<UniqueKey> for AttributeKey {
    fn eq(&self, other: &UniqueKey) -> bool {
        matches!(self, AttributeKey::Unique(key) if key == other)
    }
}

impl From<&str> for AttributeKey {
    fn from(name: &str) -> Self {
        AttributeKey::Name(name.to_string())
    }
}

impl From<String> for AttributeKey {
    fn from(name: String) -> Self {
        AttributeKey::Name(name)
    }
}

impl From<UniqueKey> for AttributeKey {
    fn from(key: UniqueKey) -> Self {
        AttributeKey::Unique(key)
    }
}

impl From<&UniqueKey> for AttributeKey {
    fn from(key: &UniqueKey) -> Self {
        AttributeKey::Unique(key.clone())
    }
}

static PATH_KEY: Lazy<AttributeKey> = Lazy::new(|| AttributeKey::Unique(UniqueKey::new("path")));

/// Process-wide key holding the path still to be matched
///
/// Path predicates read this key before falling back to the request path, and
/// directory matchers store their remaining path under it.
pub fn path_key() -> &'static AttributeKey {
    &PATH_KEY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_keys_compare_by_identity() {
        let first = UniqueKey::new("token");
        let second = UniqueKey::new("token");

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
        assert_eq!(first.label(), second.label());
    }

    #[test]
    fn test_name_keys_compare_structurally() {
        assert_eq!(AttributeKey::from("id"), AttributeKey::from("id".to_string()));
        assert!(AttributeKey::from("id") == *"id");
        assert!(AttributeKey::from(UniqueKey::new("id")) != *"id");
    }

    #[test]
    fn test_path_key_is_stable() {
        assert_eq!(path_key(), path_key());
        assert!(path_key().is_unique());
        assert_eq!(path_key().to_string(), "[path]");
    }

    #[test]
    fn test_keys_hash_consistently() {
        let unique = UniqueKey::new("a");
        let set: HashSet<AttributeKey> = [
            AttributeKey::from("a"),
            AttributeKey::from(&unique),
            AttributeKey::from(unique.clone()),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
    }
}
