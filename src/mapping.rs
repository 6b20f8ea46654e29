//! Input side of the replacer: search keys and what they turn into.

use std::fmt;

/// What a matched key is replaced with.
///
/// `Value(String::new())` and `Delete` both remove the matched text from the
/// output. They are kept apart so callers can state intent, and
/// [`Match::is_delete`](crate::Match::is_delete) reports which one matched.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Replacement {
    Value(String),
    Delete,
}

impl Replacement {
    /// The text emitted for a match; `None` for the delete marker.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Replacement::Value(s) => Some(s),
            Replacement::Delete => None,
        }
    }

    #[inline]
    pub fn is_delete(&self) -> bool {
        matches!(self, Replacement::Delete)
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Value(s) => fmt::Debug::fmt(s, f),
            Replacement::Delete => f.write_str("<delete>"),
        }
    }
}

impl From<&str> for Replacement {
    fn from(s: &str) -> Self {
        Replacement::Value(s.to_owned())
    }
}

impl From<String> for Replacement {
    fn from(s: String) -> Self {
        Replacement::Value(s)
    }
}

/// `None` means delete.
impl<S: Into<String>> From<Option<S>> for Replacement {
    fn from(s: Option<S>) -> Self {
        match s {
            Some(s) => Replacement::Value(s.into()),
            None => Replacement::Delete,
        }
    }
}

/// One search key and its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub key: String,
    pub replacement: Replacement,
}

impl Mapping {
    pub fn new(key: impl Into<String>, replacement: impl Into<Replacement>) -> Self {
        Self {
            key: key.into(),
            replacement: replacement.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(key, Replacement::Delete)
    }
}

impl<K: Into<String>, V: Into<Replacement>> From<(K, V)> for Mapping {
    fn from((key, replacement): (K, V)) -> Self {
        Self::new(key, replacement)
    }
}

/// An ordered list of mappings, validated only when compiled.
///
/// Order carries no meaning for matching; it is kept so that errors can point
/// at the offending entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSet {
    mappings: Vec<Mapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mappings: Vec::with_capacity(capacity),
        }
    }

    /// Add `key -> replacement`. Returns `self` for chaining.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        replacement: impl Into<Replacement>,
    ) -> &mut Self {
        self.mappings.push(Mapping::new(key, replacement));
        self
    }

    /// Add `key -> <delete>`.
    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.mappings.push(Mapping::delete(key));
        self
    }

    pub fn push(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mapping> {
        self.mappings.iter()
    }
}

impl<M: Into<Mapping>> FromIterator<M> for MappingSet {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            mappings: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<M: Into<Mapping>> Extend<M> for MappingSet {
    fn extend<I: IntoIterator<Item = M>>(&mut self, iter: I) {
        self.mappings.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for MappingSet {
    type Item = Mapping;
    type IntoIter = std::vec::IntoIter<Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.into_iter()
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = Mapping;
    type IntoIter = std::iter::Cloned<std::slice::Iter<'a, Mapping>>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter().cloned()
    }
}
