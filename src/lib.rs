//! # trie-replacer
//!
//! Multi-pattern literal substring replacement in a single pass.
//!
//! A set of `key -> replacement` mappings is compiled once into a frozen trie.
//! [`Replacer::apply`] then scans text left to right, replacing every
//! occurrence of a key and copying everything else through. When keys share a
//! prefix, the longest one that matches wins.
//!
//! ## Example
//!
//! ```rust
//! use trie_replacer::{Replacement, Replacer};
//!
//! let r = Replacer::compile([
//!     ("a", Replacement::from("1")),
//!     ("ab", Replacement::from("2")),
//!     ("x", Replacement::Delete),
//! ])
//! .unwrap();
//!
//! assert_eq!(r.apply("ab"), "2");
//! assert_eq!(r.apply("ac"), "1c");
//! assert_eq!(r.apply("axb"), "1b");
//! ```
//!
//! Output is never re-scanned:
//!
//! ```rust
//! # use trie_replacer::Replacer;
//! let r = Replacer::compile([("a", "aa")]).unwrap();
//! assert_eq!(r.apply("a"), "aa");
//! ```

#![deny(unsafe_code)]

use std::borrow::Cow;
use std::fmt;

use tracing::debug;

pub mod builder;
mod error;
pub mod frozen;
mod mapping;
pub mod matcher;

pub use error::{ConfigurationError, Result};
pub use frozen::{CompiledTrie, ReplacementRef};
pub use mapping::{Mapping, MappingSet, Replacement};
pub use matcher::{Match, Matches};

use builder::TrieBuilder;

// =============================================================================
// Configuration
// =============================================================================

/// Compile-time tuning. None of these settings change what `apply` outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Nodes with at most this many children are dispatched with a linear
    /// scan; larger ones use binary search.
    pub linear_scan_threshold: usize,
    /// Release spare capacity in the frozen arrays after compiling.
    pub shrink_to_fit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            linear_scan_threshold: 8,
            shrink_to_fit: true,
        }
    }
}

// =============================================================================
// Replacer
// =============================================================================

/// A compiled mapping set.
///
/// Immutable and `Send + Sync`; share it freely between threads.
#[derive(Clone)]
pub struct Replacer {
    trie: CompiledTrie,
    config: Config,
}

/// Compile `mappings` with the default [`Config`].
///
/// Fails if `mappings` is empty, or if any key is empty or repeated.
pub fn compile<I, M>(mappings: I) -> Result<Replacer>
where
    I: IntoIterator<Item = M>,
    M: Into<Mapping>,
{
    Replacer::compile(mappings)
}

impl Replacer {
    /// See [`compile`].
    pub fn compile<I, M>(mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<Mapping>,
    {
        Self::with_config(mappings, Config::default())
    }

    pub fn with_config<I, M>(mappings: I, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<Mapping>,
    {
        let mut builder = TrieBuilder::new();
        for mapping in mappings {
            let Mapping { key, replacement }: Mapping = mapping.into();
            if let Err(e) = builder.insert(&key, replacement) {
                debug!(error = %e, "rejected mapping set");
                return Err(e);
            }
        }
        let tree = builder.build().map_err(|e| {
            debug!(error = %e, "rejected mapping set");
            e
        })?;

        let trie = frozen::freeze(tree, &config);
        debug!(
            mappings = trie.len(),
            nodes = trie.node_count(),
            edges = trie.edge_count(),
            bytes = trie.memory_usage(),
            "compiled replacer"
        );
        Ok(Self { trie, config })
    }

    /// Replace every occurrence of every key in `text`.
    ///
    /// Never fails. Keys are matched longest-first at each position, and
    /// replacement text is emitted without being scanned again.
    pub fn apply(&self, text: &str) -> String {
        matcher::apply(&self.trie, text)
    }

    /// Like [`apply`](Self::apply), but borrows `text` when nothing matched.
    pub fn apply_cow<'t>(&self, text: &'t str) -> Cow<'t, str> {
        matcher::apply_cow(&self.trie, text)
    }

    /// Write the output for `text` into `out` as it is produced.
    ///
    /// Only errors raised by `out` itself are returned.
    pub fn apply_to<W: fmt::Write + ?Sized>(&self, text: &str, out: &mut W) -> fmt::Result {
        matcher::apply_to(&self.trie, text, out)
    }

    /// The matches `apply` would replace, in order.
    pub fn matches<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches::new(&self.trie, text)
    }

    /// Replacement configured for exactly `key`.
    pub fn get(&self, key: &str) -> Option<ReplacementRef<'_>> {
        self.trie.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Configured mappings in ascending key order.
    pub fn iter(&self) -> frozen::Iter<'_> {
        self.trie.iter()
    }

    /// Number of mappings. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.trie.node_count()
    }

    pub fn memory_usage(&self) -> usize {
        self.trie.memory_usage()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn trie(&self) -> &CompiledTrie {
        &self.trie
    }
}

impl fmt::Debug for Replacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|m| (m.key, m.replacement)))
            .finish()
    }
}


#[cfg(test)]
mod proptests;
