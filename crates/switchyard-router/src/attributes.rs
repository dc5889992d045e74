//! Attribute maps
//!
//! An [`AttributeMap`] is an insertion-ordered map from [`AttributeKey`] to
//! [`AttributeValue`]. It may inherit a read-only parent scope: lookups fall
//! through to the parent, writes always stay local.

use crate::key::AttributeKey;
use crate::value::AttributeValue;
use std::sync::Arc;

/// Ordered attribute map with an optional inherited scope
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchyard_router::AttributeMap;
///
/// let mut base = AttributeMap::new();
/// base.insert("lang", "en");
///
/// let mut scope = AttributeMap::inheriting(Arc::new(base));
/// scope.insert("id", "7");
///
/// assert_eq!(scope.get("lang").and_then(|v| v.as_str()), Some("en"));
/// assert_eq!(scope.get("id").and_then(|v| v.as_str()), Some("7"));
/// assert_eq!(scope.local_len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: Vec<(AttributeKey, AttributeValue)>,
    parent: Option<Arc<AttributeMap>>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope whose lookups fall through to `parent`
    pub fn inheriting(parent: Arc<AttributeMap>) -> Self {
        Self {
            entries: Vec::new(),
            parent: Some(parent),
        }
    }

    pub fn parent(&self) -> Option<&Arc<AttributeMap>> {
        self.parent.as_ref()
    }

    /// Look up a key in this scope, then in the inherited scopes
    pub fn get<Q>(&self, key: &Q) -> Option<&AttributeValue>
    where
        Q: ?Sized,
        AttributeKey: PartialEq<Q>,
    {
        self.get_local(key)
            .or_else(|| self.parent.as_deref().and_then(|parent| parent.get(key)))
    }

    /// Look up a key in this scope only
    pub fn get_local<Q>(&self, key: &Q) -> Option<&AttributeValue>
    where
        Q: ?Sized,
        AttributeKey: PartialEq<Q>,
    {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        AttributeKey: PartialEq<Q>,
    {
        self.get(key).is_some()
    }

    /// Assign a value, replacing any local entry with the same key
    pub fn insert(
        &mut self,
        key: impl Into<AttributeKey>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Add a value, turning an existing local entry into an array
    ///
    /// Array values are spliced into the existing array.
    pub fn append(&mut self, key: impl Into<AttributeKey>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.append(value),
            None => self.entries.push((key, value)),
        }
    }

    /// Remove a local entry
    pub fn remove<Q>(&mut self, key: &Q) -> Option<AttributeValue>
    where
        Q: ?Sized,
        AttributeKey: PartialEq<Q>,
    {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Assign every local entry of `other` into this map
    pub fn merge(&mut self, other: AttributeMap) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Iterate over local entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn local_len(&self) -> usize {
        self.entries.len()
    }

    /// True when neither this scope nor any inherited scope has entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.parent.as_deref().map_or(true, AttributeMap::is_empty)
    }

    /// Collapse the scope chain into a standalone map
    ///
    /// Inherited entries come first, shadowed by local entries with the same
    /// key.
    pub fn flatten(&self) -> AttributeMap {
        let mut flat = match self.parent.as_deref() {
            Some(parent) => parent.flatten(),
            None => AttributeMap::new(),
        };

        for (key, value) in &self.entries {
            flat.insert(key.clone(), value.clone());
        }

        flat
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeMap
where
    K: Into<AttributeKey>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for AttributeMap
where
    K: Into<AttributeKey>,
    V: Into<AttributeValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
