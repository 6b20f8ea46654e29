use crate::frozen::{Terminal, ROOT};
use crate::{CompiledTrie, ConfigurationError, Replacement, Replacer};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, HashSet};

/// Check the structural invariants of a frozen trie.
fn validate_trie(t: &CompiledTrie) {
    assert!(!t.nodes.is_empty(), "trie must have a root");
    assert_eq!(t.labels.len(), t.targets.len(), "edge arrays must be parallel");
    assert_eq!(t.labels.len() + 1, t.nodes.len(), "every non-root node has one parent edge");

    let mut seen_targets: HashSet<u32> = HashSet::new();
    let mut terminals = 0usize;
    let mut values = 0usize;
    let mut next_edge = 0usize;

    for (id, node) in t.nodes.iter().enumerate() {
        let edges = node.edges();
        assert_eq!(edges.start, next_edge, "edge runs must be contiguous in node order");
        next_edge = edges.end;

        let labels = &t.labels[edges.clone()];
        assert!(
            labels.windows(2).all(|w| w[0] < w[1]),
            "edge labels must be strictly ascending (node {id})"
        );
        for &target in &t.targets[edges] {
            assert!(target as usize > id, "children are numbered after their parent");
            assert!((target as usize) < t.nodes.len(), "edge target out of range");
            assert!(seen_targets.insert(target), "node {target} has two parents");
        }

        if node.edge_count == 0 && id as u32 != ROOT {
            assert!(!node.terminal.is_none(), "leaf node {id} ends no key");
        }
        if !node.terminal.is_none() {
            terminals += 1;
            if !node.terminal.is_delete() {
                values += 1;
            }
        }
    }
    assert_eq!(next_edge, t.labels.len());
    assert!(!seen_targets.contains(&ROOT), "root must have no parent");
    assert!(t.nodes[ROOT as usize].terminal == Terminal::NONE, "keys are never empty");

    assert_eq!(terminals, t.len(), "terminal count must match mapping count");
    assert_eq!(values + 1, t.value_offsets.len());
    assert!(t.value_offsets.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*t.value_offsets.last().unwrap() as usize, t.value_pool.len());
}

/// Reference scanner: at every position try every key and keep the longest.
pub(crate) fn reference_apply(mappings: &[(String, Replacement)], text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let best = mappings
            .iter()
            .filter(|(k, _)| rest.starts_with(k.as_str()))
            .max_by_key(|(k, _)| k.len());
        match best {
            Some((k, r)) => {
                out.push_str(r.as_str().unwrap_or(""));
                rest = &rest[k.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    out
}

/// A deliberately tiny alphabet so that generated keys overlap and share
/// prefixes often. Includes multi-byte chars.
#[derive(Arbitrary, Clone, Copy, Debug)]
enum Sym {
    A,
    B,
    C,
    Eszett,
    Kanji,
}

impl Sym {
    fn ch(self) -> char {
        match self {
            Sym::A => 'a',
            Sym::B => 'b',
            Sym::C => 'c',
            Sym::Eszett => 'ß',
            Sym::Kanji => '字',
        }
    }
}

fn word(syms: Vec<Sym>) -> String {
    syms.into_iter().map(Sym::ch).collect()
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<Sym>(), 1..=4).prop_map(word)
}

fn replacement_strategy() -> impl Strategy<Value = Replacement> {
    prop_oneof![
        4 => prop::collection::vec(any::<Sym>(), 0..=3).prop_map(|s| Replacement::Value(word(s))),
        1 => Just(Replacement::Delete),
    ]
}

fn mappings_strategy() -> impl Strategy<Value = Vec<(String, Replacement)>> {
    prop::collection::btree_map(key_strategy(), replacement_strategy(), 1..10)
        .prop_map(|m| m.into_iter().collect())
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<Sym>(), 0..=48).prop_map(word)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_reference(
        mappings in mappings_strategy(),
        texts in prop::collection::vec(text_strategy(), 1..8),
    ) {
        let r = Replacer::compile(mappings.clone()).unwrap();
        validate_trie(r.trie());
        prop_assert_eq!(r.len(), mappings.len());

        for text in &texts {
            let expected = reference_apply(&mappings, text);
            prop_assert_eq!(r.apply(text), expected.clone());
            prop_assert_eq!(r.apply_cow(text).into_owned(), expected.clone());

            let mut streamed = String::new();
            r.apply_to(text, &mut streamed).unwrap();
            prop_assert_eq!(streamed, expected);
        }
    }

    #[test]
    fn prop_identity_on_unmatched(
        mappings in mappings_strategy(),
        text in "[xyz0-9 .,é]{0,64}",
    ) {
        let r = Replacer::compile(mappings).unwrap();
        prop_assert!(r.matches(&text).next().is_none());
        prop_assert!(matches!(r.apply_cow(&text), std::borrow::Cow::Borrowed(_)));
        prop_assert_eq!(r.apply(&text), text);
    }

    #[test]
    fn prop_single_full_match(mappings in mappings_strategy(), pick in any::<prop::sample::Index>()) {
        let (key, replacement) = pick.get(&mappings).clone();
        let r = Replacer::compile(mappings).unwrap();
        prop_assert_eq!(r.apply(&key), replacement.as_str().unwrap_or(""));
    }

    #[test]
    fn prop_order_independence(
        (mappings, shuffled) in mappings_strategy()
            .prop_flat_map(|m| (Just(m.clone()), Just(m).prop_shuffle())),
        text in text_strategy(),
    ) {
        let a = Replacer::compile(mappings).unwrap();
        let b = Replacer::compile(shuffled).unwrap();
        prop_assert_eq!(a.apply(&text), b.apply(&text));
        prop_assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_matches_tile_the_output(mappings in mappings_strategy(), text in text_strategy()) {
        let r = Replacer::compile(mappings.clone()).unwrap();
        let mut last = 0;
        for m in r.matches(&text) {
            prop_assert!(m.start() >= last, "matches must not overlap");
            prop_assert!(m.end() > m.start(), "matches are never empty");
            let key = &text[m.range()];
            prop_assert_eq!(r.get(key), Some(m.replacement()));
            last = m.end();
        }
    }

    #[test]
    fn prop_iter_round_trips_mapping_set(mappings in mappings_strategy()) {
        let r = Replacer::compile(mappings.clone()).unwrap();
        let expected: BTreeMap<String, Replacement> = mappings.into_iter().collect();
        let got: Vec<(String, Replacement)> = r.iter().map(|m| (m.key, m.replacement)).collect();
        prop_assert_eq!(got, expected.into_iter().collect::<Vec<_>>());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let mappings: Vec<(String, Replacement)> = vec![
        ("a".into(), "1".into()),
        ("b".into(), "2".into()),
        ("ab".into(), Replacement::Delete),
        ("abc".into(), "3".into()),
        ("ba".into(), "".into()),
        ("c".into(), "cc".into()),
    ];
    let inputs = ["", "abcabc", "abab", "bac", "cab", "aabbcc", "xyz", "abcd", "bbaa"];

    let baseline = Replacer::compile(mappings.clone()).unwrap();
    let expected: Vec<String> = inputs.iter().map(|t| baseline.apply(t)).collect();
    for (text, want) in inputs.iter().zip(&expected) {
        assert_eq!(want, &reference_apply(&mappings, text));
    }

    for_each_permutation(&mappings, |perm| {
        let r = Replacer::compile(perm).unwrap();
        validate_trie(r.trie());
        let got: Vec<String> = inputs.iter().map(|t| r.apply(t)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_duplicate_position_small_set() {
    // Wherever the duplicate lands, compilation fails the same way.
    let keys = ["a", "ab", "b", "ab"];
    for_each_permutation(&keys, |perm| {
        let err = Replacer::compile(perm.iter().map(|k| (*k, "x"))).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateKey { key: "ab".into() });
    });
}
