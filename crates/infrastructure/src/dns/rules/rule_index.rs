use super::suffix_trie::SuffixTrie;
use compact_str::CompactString;
use dnsguard_domain::{Rule, RulePattern};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Compiled, immutable lookup structure over a list of rules.
///
/// Exact patterns go into a hash map, suffix patterns into a reversed-label
/// trie. Both store positions into `rules`, so the insertion order is the
/// final tie-breaker.
pub struct RuleIndex {
    rules: Vec<Rule>,
    exact: HashMap<CompactString, SmallVec<[u32; 2]>, FxBuildHasher>,
    suffixes: SuffixTrie,
}

impl RuleIndex {
    pub fn compile(rules: Vec<Rule>) -> Self {
        let mut exact: HashMap<CompactString, SmallVec<[u32; 2]>, FxBuildHasher> =
            HashMap::with_hasher(FxBuildHasher);
        let mut suffixes = SuffixTrie::new();

        for (pos, rule) in rules.iter().enumerate() {
            let id = pos as u32;
            match &rule.pattern {
                RulePattern::Exact(domain) => {
                    exact
                        .entry(CompactString::new(domain.as_ref()))
                        .or_default()
                        .push(id);
                }
                RulePattern::Suffix(domain) => suffixes.insert(domain, id),
            }
        }

        Self {
            rules,
            exact,
            suffixes,
        }
    }

    pub fn empty() -> Self {
        Self::compile(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The single winning rule for `name`: highest priority, then most
    /// specific pattern, then earliest inserted.
    pub fn best_match(&self, name: &str) -> Option<&Rule> {
        let mut candidates = self.suffixes.lookup(name);
        if let Some(ids) = self.exact.get(name) {
            candidates.extend_from_slice(ids);
        }

        let mut best: Option<u32> = None;
        for id in candidates {
            best = match best {
                None => Some(id),
                Some(current) => {
                    let ord = self.rules[id as usize].precedence_cmp(&self.rules[current as usize]);
                    match ord {
                        Ordering::Greater => Some(id),
                        Ordering::Equal if id < current => Some(id),
                        _ => Some(current),
                    }
                }
            };
        }

        best.map(|id| &self.rules[id as usize])
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.exact.contains_key(name) || !self.suffixes.lookup(name).is_empty()
    }
}
