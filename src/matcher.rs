//! Single left-to-right scan over a compiled trie.
//!
//! At each cursor position the trie is walked as far as the input allows and
//! the deepest terminal seen on the way wins. Output is never re-scanned, so a
//! replacement that contains a key is emitted verbatim.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use tracing::trace;

use crate::frozen::{CompiledTrie, ReplacementRef, ROOT};

/// One replaced occurrence in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'r> {
    start: usize,
    end: usize,
    replacement: ReplacementRef<'r>,
}

impl<'r> Match<'r> {
    /// Byte offset of the first char of the matched key.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the matched key.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn replacement(&self) -> ReplacementRef<'r> {
        self.replacement
    }

    /// Text emitted in place of the key.
    #[inline]
    pub fn as_str(&self) -> &'r str {
        self.replacement.as_str()
    }

    #[inline]
    pub fn is_delete(&self) -> bool {
        self.replacement.is_delete()
    }
}

/// Iterator over the matches of a scan, in input order.
///
/// Created by [`Replacer::matches`](crate::Replacer::matches).
pub struct Matches<'r, 't> {
    trie: &'r CompiledTrie,
    text: &'t str,
    pos: usize,
}

impl<'r, 't> Matches<'r, 't> {
    pub(crate) fn new(trie: &'r CompiledTrie, text: &'t str) -> Self {
        Self { trie, text, pos: 0 }
    }
}

impl<'r> Iterator for Matches<'r, '_> {
    type Item = Match<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let start = self.pos;
            match longest_match(self.trie, &self.text[start..]) {
                Ok((len, replacement)) => {
                    self.pos = start + len;
                    return Some(Match {
                        start,
                        end: start + len,
                        replacement,
                    });
                }
                Err(skip) => self.pos = start + skip,
            }
        }
        None
    }
}

/// Walk the trie along the front of `text`.
///
/// `Ok((len, replacement))` for the longest key that `text` starts with;
/// otherwise `Err(len)` with the byte length of the first char, which is
/// copied through unchanged.
#[inline]
fn longest_match<'r>(
    trie: &'r CompiledTrie,
    text: &str,
) -> Result<(usize, ReplacementRef<'r>), usize> {
    let mut node = ROOT;
    let mut best = None;

    for (i, ch) in text.char_indices() {
        match trie.child(node, ch) {
            Some(next) => node = next,
            None => break,
        }
        let terminal = trie.terminal(node);
        if !terminal.is_none() {
            best = Some((i + ch.len_utf8(), terminal));
        }
    }

    match best {
        Some((len, terminal)) => Ok((len, trie.resolve(terminal))),
        None => Err(text.chars().next().map_or(1, char::len_utf8)),
    }
}

/// Replace every match in `text`, borrowing the input when nothing matched.
pub fn apply_cow<'t>(trie: &CompiledTrie, text: &'t str) -> Cow<'t, str> {
    let mut matches = Matches::new(trie, text);
    let Some(first) = matches.next() else {
        trace!(input_len = text.len(), replaced = 0, "apply");
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut replaced = 0usize;
    let mut last = 0;
    for m in std::iter::once(first).chain(matches) {
        out.push_str(&text[last..m.start]);
        out.push_str(m.as_str());
        last = m.end;
        replaced += 1;
    }
    out.push_str(&text[last..]);

    trace!(
        input_len = text.len(),
        output_len = out.len(),
        replaced,
        "apply"
    );
    Cow::Owned(out)
}

/// Replace every match in `text`.
pub fn apply(trie: &CompiledTrie, text: &str) -> String {
    apply_cow(trie, text).into_owned()
}

/// Stream the output of a scan into `out` piece by piece.
pub fn apply_to<W: fmt::Write + ?Sized>(
    trie: &CompiledTrie,
    text: &str,
    out: &mut W,
) -> fmt::Result {
    let mut last = 0;
    for m in Matches::new(trie, text) {
        out.write_str(&text[last..m.start])?;
        out.write_str(m.as_str())?;
        last = m.end;
    }
    out.write_str(&text[last..])
}
