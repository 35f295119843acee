use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A node in the reversed-label suffix trie.
#[derive(Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    /// Rules whose suffix pattern terminates at this node.
    rule_ids: SmallVec<[u32; 2]>,
}

/// Suffix trie for `Suffix` rule patterns.
///
/// Patterns are stored as reversed label paths:
/// `ads.com` → traverse ["com", "ads"], record the rule id at "ads".
///
/// Lookup for `sub.ads.com`:
///   Reversed labels: ["com", "ads", "sub"]
///   Walk: root → "com" → "ads" (ids recorded → match) → "sub"
///
/// A suffix pattern matches its own apex as well as every subdomain, so the
/// ids at the final node count too. Matching is always on label
/// boundaries: `ads.com` never matches `badads.com`.
///
/// Built once per compile and replaced with the whole index.
#[derive(Default)]
pub struct SuffixTrie {
    root: TrieNode,
    len: usize,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records `rule_id` under the normalized `domain`.
    pub fn insert(&mut self, domain: &str, rule_id: u32) {
        let mut node = &mut self.root;
        for label in domain.split('.').rev() {
            node = node.children.entry(CompactString::new(label)).or_default();
        }
        node.rule_ids.push(rule_id);
        self.len += 1;
    }

    /// Ids of every suffix pattern covering `domain`, shortest suffix first.
    #[inline]
    pub fn lookup(&self, domain: &str) -> SmallVec<[u32; 4]> {
        let mut node = &self.root;
        let mut result = SmallVec::new();

        for label in domain.split('.').rev() {
            match node.children.get(label) {
                Some(child) => {
                    result.extend_from_slice(&child.rule_ids);
                    node = child;
                }
                None => break,
            }
        }

        result
    }
}
