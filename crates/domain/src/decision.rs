use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The rule store's answer for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum Decision {
    Block,
    Allow,
    Rewrite(Arc<str>),
}

impl Decision {
    pub fn is_block(&self) -> bool {
        matches!(self, Decision::Block)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Block => "block",
            Decision::Allow => "allow",
            Decision::Rewrite(_) => "rewrite",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Rewrite(target) => write!(f, "rewrite({target})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Which layer of the rule store produced a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    BypassGrant,
    Whitelist,
    Rule { source_id: Arc<str> },
    Default,
}

/// A decision together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub source: DecisionSource,
}

impl Verdict {
    pub fn new(decision: Decision, source: DecisionSource) -> Self {
        Self { decision, source }
    }

    pub fn default_allow() -> Self {
        Self::new(Decision::Allow, DecisionSource::Default)
    }
}
