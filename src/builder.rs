//! Mutable prefix tree assembled from a mapping set before freezing.
//!
//! Nodes live in a flat arena and refer to each other by index. Children are
//! an unsorted `(char, index)` list; most nodes have one or two, so they stay
//! inline.

use smallvec::SmallVec;

use crate::error::{ConfigurationError, Result};
use crate::mapping::Replacement;

pub(crate) type BuilderId = u32;

pub(crate) const ROOT: BuilderId = 0;

#[derive(Debug, Default)]
pub(crate) struct BuilderNode {
    pub(crate) children: SmallVec<[(char, BuilderId); 2]>,
    pub(crate) terminal: Option<Replacement>,
}

impl BuilderNode {
    #[inline]
    fn child(&self, ch: char) -> Option<BuilderId> {
        self.children
            .iter()
            .find_map(|&(c, id)| (c == ch).then_some(id))
    }

    fn set_terminal(&mut self, replacement: Replacement) {
        debug_assert!(
            self.terminal.is_none(),
            "terminal replacement set twice on the same node"
        );
        self.terminal = Some(replacement);
    }
}

/// Accumulates mappings one at a time.
///
/// ```rust
/// use trie_replacer::builder::TrieBuilder;
/// use trie_replacer::Replacement;
///
/// let mut b = TrieBuilder::new();
/// b.insert("a", "1".into()).unwrap();
/// b.insert("ab", Replacement::Delete).unwrap();
/// assert!(b.insert("a", "2".into()).is_err());
/// assert_eq!(b.len(), 2);
/// ```
#[derive(Debug)]
pub struct TrieBuilder {
    nodes: Vec<BuilderNode>,
    /// Number of `insert` calls so far, successful or not.
    attempts: usize,
    count: usize,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![BuilderNode::default()],
            attempts: 0,
            count: 0,
        }
    }

    /// Number of mappings inserted.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add one mapping.
    ///
    /// Fails if `key` is empty or was inserted before; the builder is left
    /// unchanged in both cases.
    pub fn insert(&mut self, key: &str, replacement: Replacement) -> Result<()> {
        let index = self.attempts;
        self.attempts += 1;

        if key.is_empty() {
            return Err(ConfigurationError::EmptyKey { index });
        }

        let mut node = ROOT;
        for ch in key.chars() {
            node = self.child_or_insert(node, ch);
        }

        let leaf = &mut self.nodes[node as usize];
        if leaf.terminal.is_some() {
            // Every node on the path already existed, so nothing was added.
            return Err(ConfigurationError::DuplicateKey {
                key: key.to_owned(),
            });
        }
        leaf.set_terminal(replacement);
        self.count += 1;
        Ok(())
    }

    /// Finish building. Fails if nothing was inserted.
    pub fn build(self) -> Result<BuilderTree> {
        if self.count == 0 {
            return Err(ConfigurationError::EmptyMappingSet);
        }
        Ok(BuilderTree {
            nodes: self.nodes,
            mappings: self.count,
        })
    }

    fn child_or_insert(&mut self, parent: BuilderId, ch: char) -> BuilderId {
        if let Some(child) = self.nodes[parent as usize].child(ch) {
            return child;
        }
        debug_assert!(self.nodes.len() < BuilderId::MAX as usize);
        let child = self.nodes.len() as BuilderId;
        self.nodes.push(BuilderNode::default());
        self.nodes[parent as usize].children.push((ch, child));
        child
    }
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete, validated builder tree, ready to be frozen.
#[derive(Debug)]
pub struct BuilderTree {
    pub(crate) nodes: Vec<BuilderNode>,
    pub(crate) mappings: usize,
}

impl BuilderTree {
    #[inline]
    pub fn len(&self) -> usize {
        self.mappings
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings == 0
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
