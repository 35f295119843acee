mod local_lists;
mod rule_index;
mod store;
mod suffix_trie;

pub use local_lists::LocalLists;
pub use rule_index::RuleIndex;
pub use store::RuleStore;
