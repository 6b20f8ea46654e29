//! Immutable, index-addressed trie produced by freezing a [`BuilderTree`].
//!
//! Layout:
//! - `nodes[0]` is the root; nodes are numbered in breadth-first order.
//! - Each node's children form one contiguous run of edges. `labels[i]` is
//!   the char on edge `i` and `targets[i]` the child it leads to. Runs are
//!   sorted by char so dispatch can binary search.
//! - Replacement strings are concatenated into one pool and addressed by
//!   `value_offsets`.

use std::collections::VecDeque;
use std::fmt;

use crate::builder::{self, BuilderTree};
use crate::mapping::{Mapping, Replacement};
use crate::Config;

pub(crate) type NodeId = u32;

pub(crate) const ROOT: NodeId = 0;

// =============================================================================
// Terminal tag
// =============================================================================

/// Terminal marker packed into a `u32`.
///
/// - `u32::MAX`: no key ends here
/// - `u32::MAX - 1`: a key ends here and is deleted
/// - anything else: a key ends here, value index into the pool
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Terminal(u32);

impl Terminal {
    pub(crate) const NONE: Terminal = Terminal(u32::MAX);
    pub(crate) const DELETE: Terminal = Terminal(u32::MAX - 1);

    #[inline]
    fn value(idx: u32) -> Self {
        debug_assert!(idx < Self::DELETE.0);
        Self(idx)
    }

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub(crate) fn is_delete(self) -> bool {
        self == Self::DELETE
    }

    #[inline]
    fn value_idx(self) -> Option<usize> {
        (self.0 < Self::DELETE.0).then_some(self.0 as usize)
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value_idx() {
            Some(idx) => write!(f, "Value({idx})"),
            None if self.is_delete() => f.write_str("Delete"),
            None => f.write_str("None"),
        }
    }
}

/// Borrowed view of a replacement stored in a compiled trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementRef<'a> {
    Value(&'a str),
    Delete,
}

impl<'a> ReplacementRef<'a> {
    /// The emitted text; empty for the delete marker.
    #[inline]
    pub fn as_str(self) -> &'a str {
        match self {
            ReplacementRef::Value(s) => s,
            ReplacementRef::Delete => "",
        }
    }

    #[inline]
    pub fn is_delete(self) -> bool {
        matches!(self, ReplacementRef::Delete)
    }

    pub fn to_replacement(self) -> Replacement {
        match self {
            ReplacementRef::Value(s) => Replacement::Value(s.to_owned()),
            ReplacementRef::Delete => Replacement::Delete,
        }
    }
}

impl From<ReplacementRef<'_>> for Replacement {
    fn from(r: ReplacementRef<'_>) -> Self {
        r.to_replacement()
    }
}

// =============================================================================
// Compiled trie
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub(crate) first_edge: u32,
    pub(crate) edge_count: u32,
    pub(crate) terminal: Terminal,
}

impl Node {
    #[inline]
    pub(crate) fn edges(self) -> std::ops::Range<usize> {
        let start = self.first_edge as usize;
        start..start + self.edge_count as usize
    }
}

/// The frozen trie. Never mutated after [`freeze`].
#[derive(Clone)]
pub struct CompiledTrie {
    pub(crate) nodes: Vec<Node>,
    pub(crate) labels: Vec<char>,
    pub(crate) targets: Vec<NodeId>,
    pub(crate) value_pool: String,
    /// `value_offsets[i]..value_offsets[i + 1]` is value `i` in the pool.
    pub(crate) value_offsets: Vec<u32>,
    pub(crate) mappings: usize,
    pub(crate) linear_scan_threshold: usize,
}

/// Convert a builder tree into its frozen form.
pub fn freeze(tree: BuilderTree, config: &Config) -> CompiledTrie {
    let BuilderTree {
        nodes: mut builder_nodes,
        mappings,
    } = tree;

    let node_count = builder_nodes.len();
    let mut nodes = Vec::with_capacity(node_count);
    let mut labels = Vec::with_capacity(node_count.saturating_sub(1));
    let mut targets = Vec::with_capacity(node_count.saturating_sub(1));
    let mut value_pool = String::new();
    let mut value_offsets = vec![0u32];

    // Children get ids in the order they are enqueued, which is also the order
    // they are dequeued and pushed onto `nodes`.
    let mut queue = VecDeque::with_capacity(node_count);
    queue.push_back(builder::ROOT);
    let mut next_id: NodeId = 1;

    while let Some(bid) = queue.pop_front() {
        let bnode = &mut builder_nodes[bid as usize];

        let terminal = match bnode.terminal.take() {
            None => Terminal::NONE,
            Some(Replacement::Delete) => Terminal::DELETE,
            Some(Replacement::Value(s)) => {
                let idx = (value_offsets.len() - 1) as u32;
                value_pool.push_str(&s);
                debug_assert!(value_pool.len() <= u32::MAX as usize);
                value_offsets.push(value_pool.len() as u32);
                Terminal::value(idx)
            }
        };

        let mut children = std::mem::take(&mut bnode.children);
        children.sort_unstable_by_key(|&(ch, _)| ch);

        let first_edge = labels.len() as u32;
        for (ch, child) in children.iter().copied() {
            labels.push(ch);
            targets.push(next_id);
            next_id += 1;
            queue.push_back(child);
        }

        nodes.push(Node {
            first_edge,
            edge_count: children.len() as u32,
            terminal,
        });
    }
    debug_assert_eq!(nodes.len(), node_count);

    let mut trie = CompiledTrie {
        nodes,
        labels,
        targets,
        value_pool,
        value_offsets,
        mappings,
        linear_scan_threshold: config.linear_scan_threshold,
    };
    if config.shrink_to_fit {
        trie.shrink_to_fit();
    }
    trie
}

impl CompiledTrie {
    /// Number of mappings compiled in.
    #[inline]
    pub fn len(&self) -> usize {
        self.mappings
    }

    /// Always `false`: empty mapping sets are rejected at build time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings == 0
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.labels.len()
    }

    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
            + self.labels.capacity() * std::mem::size_of::<char>()
            + self.targets.capacity() * std::mem::size_of::<NodeId>()
            + self.value_pool.capacity()
            + self.value_offsets.capacity() * std::mem::size_of::<u32>()
    }

    fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.labels.shrink_to_fit();
        self.targets.shrink_to_fit();
        self.value_pool.shrink_to_fit();
        self.value_offsets.shrink_to_fit();
    }

    /// Follow the edge labelled `ch` out of `node`.
    #[inline]
    pub(crate) fn child(&self, node: NodeId, ch: char) -> Option<NodeId> {
        let edges = self.nodes[node as usize].edges();
        let start = edges.start;
        let labels = &self.labels[edges];

        let pos = if labels.len() <= self.linear_scan_threshold {
            labels.iter().position(|&c| c == ch)
        } else {
            labels.binary_search(&ch).ok()
        };
        pos.map(|i| self.targets[start + i])
    }

    #[inline]
    pub(crate) fn terminal(&self, node: NodeId) -> Terminal {
        self.nodes[node as usize].terminal
    }

    /// Resolve a terminal that is known to be set.
    #[inline]
    pub(crate) fn resolve(&self, terminal: Terminal) -> ReplacementRef<'_> {
        debug_assert!(!terminal.is_none(), "resolved an unset terminal");
        match terminal.value_idx() {
            Some(idx) => {
                let start = self.value_offsets[idx] as usize;
                let end = self.value_offsets[idx + 1] as usize;
                ReplacementRef::Value(&self.value_pool[start..end])
            }
            None => ReplacementRef::Delete,
        }
    }

    /// Exact lookup of a configured key.
    pub fn get(&self, key: &str) -> Option<ReplacementRef<'_>> {
        let mut node = ROOT;
        for ch in key.chars() {
            node = self.child(node, ch)?;
        }
        let terminal = self.terminal(node);
        (!terminal.is_none()).then(|| self.resolve(terminal))
    }

    /// All mappings in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            trie: self,
            stack: vec![(ROOT, 0, None)],
            key: String::new(),
        }
    }
}

impl fmt::Debug for CompiledTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTrie")
            .field("mappings", &self.mappings)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.labels.len())
            .field("value_bytes", &self.value_pool.len())
            .finish()
    }
}

/// Depth-first walk over a compiled trie, rebuilding each key on the way.
pub struct Iter<'a> {
    trie: &'a CompiledTrie,
    /// (node, key length in bytes before its label, label)
    stack: Vec<(NodeId, usize, Option<char>)>,
    key: String,
}

impl Iterator for Iter<'_> {
    type Item = Mapping;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, depth, label)) = self.stack.pop() {
            self.key.truncate(depth);
            if let Some(ch) = label {
                self.key.push(ch);
            }
            let n = self.trie.nodes[node as usize];

            // Reverse so the smallest char is popped first.
            let depth = self.key.len();
            for i in n.edges().rev() {
                self.stack
                    .push((self.trie.targets[i], depth, Some(self.trie.labels[i])));
            }

            if !n.terminal.is_none() {
                return Some(Mapping {
                    key: self.key.clone(),
                    replacement: self.trie.resolve(n.terminal).to_replacement(),
                });
            }
        }
        None
    }
}
