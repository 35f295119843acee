//! Manifest documents: the parsed form of a rule-source bundle.
//!
//! Fetching is someone else's job. Everything here turns an already-fetched
//! document into a validated [`RuleSet`], or refuses it as a whole.

use crate::validators::validate_domain_name;
use crate::{DomainError, Rule, RuleAction, RulePattern, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Manifest format versions this build can compile.
pub const SUPPORTED_FORMAT_VERSIONS: &[u32] = &[1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn parse_document(&self, raw: &str) -> Result<ManifestDocument, DomainError> {
        match self {
            ManifestFormat::Json => serde_json::from_str(raw)
                .map_err(|e| DomainError::ManifestRejected(format!("invalid JSON: {e}"))),
            ManifestFormat::Toml => toml::from_str(raw)
                .map_err(|e| DomainError::ManifestRejected(format!("invalid TOML: {e}"))),
        }
    }

    /// Guesses the format from a file extension; JSON when unknown.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext.map(|e| e.to_ascii_lowercase()) {
            Some(e) if e == "toml" => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

impl FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ManifestFormat::Json),
            "toml" => Ok(ManifestFormat::Toml),
            other => Err(format!("unknown manifest format '{other}'")),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestFormat::Json => f.write_str("json"),
            ManifestFormat::Toml => f.write_str("toml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteEntry {
    pub domain: String,
    pub target: String,
}

/// One rule provider inside a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSourceDocument {
    pub id: String,

    /// Inactive sources are carried in the manifest but contribute no rules.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub block: Vec<String>,

    #[serde(default)]
    pub allow: Vec<String>,

    #[serde(default)]
    pub rewrite: Vec<RewriteEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub identifier: String,
    pub format_version: u32,
    #[serde(default)]
    pub sources: Vec<RuleSourceDocument>,
}

impl ManifestDocument {
    /// Validates the whole document and compiles it into a rule set.
    ///
    /// Any bad entry rejects the entire manifest; nothing partial escapes.
    pub fn into_rule_set(&self) -> Result<RuleSet, DomainError> {
        if self.identifier.trim().is_empty() {
            return Err(DomainError::ManifestRejected(
                "manifest identifier is empty".to_string(),
            ));
        }
        if !SUPPORTED_FORMAT_VERSIONS.contains(&self.format_version) {
            return Err(DomainError::ManifestRejected(format!(
                "unsupported format_version {} (supported: {:?})",
                self.format_version, SUPPORTED_FORMAT_VERSIONS
            )));
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::new();

        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(DomainError::ManifestRejected(
                    "rule source with empty id".to_string(),
                ));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(DomainError::ManifestRejected(format!(
                    "duplicate rule source id '{}'",
                    source.id
                )));
            }
            if !source.enabled {
                continue;
            }

            let reject = |e: DomainError| {
                DomainError::ManifestRejected(format!("source '{}': {}", source.id, e))
            };

            for entry in &source.block {
                let pattern = RulePattern::parse_list_entry(entry).map_err(reject)?;
                rules.push(Rule::new(pattern, RuleAction::Block, &source.id, source.priority));
            }
            for entry in &source.allow {
                let pattern = RulePattern::parse_list_entry(entry).map_err(reject)?;
                rules.push(Rule::new(pattern, RuleAction::Allow, &source.id, source.priority));
            }
            for entry in &source.rewrite {
                let pattern = RulePattern::parse_list_entry(&entry.domain).map_err(reject)?;
                let target = validate_domain_name(&entry.target).map_err(reject)?;
                rules.push(Rule::new(
                    pattern,
                    RuleAction::Rewrite(Arc::from(target)),
                    &source.id,
                    source.priority,
                ));
            }
        }

        Ok(RuleSet::new(rules).with_origin(format!(
            "{}@v{}",
            self.identifier, self.format_version
        )))
    }
}

fn default_true() -> bool {
    true
}
