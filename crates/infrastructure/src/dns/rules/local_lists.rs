use dnsguard_domain::config::BlockingConfig;
use dnsguard_domain::{DomainError, Rule, RuleAction, RulePattern};

/// Source id given to locally configured block entries.
pub const LOCAL_SOURCE_ID: &str = "local";

/// Block and whitelist entries from the local configuration.
#[derive(Debug, Clone, Default)]
pub struct LocalLists {
    pub enabled: bool,
    pub block: Vec<Rule>,
    pub whitelist: Vec<Rule>,
}

impl LocalLists {
    pub fn from_config(config: &BlockingConfig) -> Result<Self, DomainError> {
        let block = config
            .blocked_domains
            .iter()
            .map(|entry| {
                RulePattern::parse_list_entry(entry).map(|p| {
                    Rule::new(p, RuleAction::Block, LOCAL_SOURCE_ID, config.local_priority)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let whitelist = config
            .whitelisted_domains
            .iter()
            .map(|entry| {
                RulePattern::parse_list_entry(entry)
                    .map(|p| Rule::new(p, RuleAction::Allow, "whitelist", 0))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enabled: config.enabled,
            block,
            whitelist,
        })
    }

    /// Everything enabled, nothing listed.
    pub fn permissive() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}
