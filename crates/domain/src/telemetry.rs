use crate::{CredentialKind, GrantId, InterfaceId, RecordType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How much of a queried name may leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    /// Full domain names.
    Full,
    /// SHA-256 of the name, truncated. Correlatable, not readable.
    #[default]
    Hashed,
    /// Only the last label (e.g. "com"). Nothing per-site.
    Minimal,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Hashed => "hashed",
            Self::Minimal => "minimal",
        }
    }
}

impl FromStr for PrivacyLevel {
    type Err = String;

    /// Accepts names or the numeric levels 0 (full), 1 (hashed), 2 (minimal).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" | "0" => Ok(Self::Full),
            "hashed" | "1" => Ok(Self::Hashed),
            "minimal" | "2" => Ok(Self::Minimal),
            other => Err(format!("unknown privacy level '{other}'")),
        }
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one query through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcomeTag {
    Blocked,
    CacheHit,
    Resolved,
    Failed,
}

impl QueryOutcomeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::CacheHit => "cache_hit",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEventKind {
    QueryCompleted {
        outcome: QueryOutcomeTag,
        record_type: RecordType,
        decision: &'static str,
        latency_us: u64,
        interface: Option<InterfaceId>,
    },
    /// Only emitted when verbose telemetry is on.
    ResolutionAttempt {
        attempt: u32,
        interface: InterfaceId,
        success: bool,
    },
    BypassGranted {
        grant_id: GrantId,
        covers_all: bool,
        ttl_secs: u64,
        credential: CredentialKind,
    },
    BypassRevoked {
        grant_id: GrantId,
    },
    BypassRejected {
        locked_out: bool,
    },
    RulesReplaced {
        origin: Option<Arc<str>>,
        rule_count: usize,
    },
    ManifestRejected {
        reason: String,
    },
}

impl TelemetryEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueryCompleted { .. } => "query_completed",
            Self::ResolutionAttempt { .. } => "resolution_attempt",
            Self::BypassGranted { .. } => "bypass_granted",
            Self::BypassRevoked { .. } => "bypass_revoked",
            Self::BypassRejected { .. } => "bypass_rejected",
            Self::RulesReplaced { .. } => "rules_replaced",
            Self::ManifestRejected { .. } => "manifest_rejected",
        }
    }
}

/// Event as produced by the core, before privacy redaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    pub kind: TelemetryEventKind,
    /// Domain the event concerns, if any. Redacted according to
    /// [`PrivacyLevel`] before it reaches a sink.
    pub domain: Option<Arc<str>>,
}

impl TelemetryEvent {
    pub fn new(kind: TelemetryEventKind) -> Self {
        Self { kind, domain: None }
    }

    pub fn for_domain(kind: TelemetryEventKind, domain: &Arc<str>) -> Self {
        Self {
            kind,
            domain: Some(Arc::clone(domain)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
