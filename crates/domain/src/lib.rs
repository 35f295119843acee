//! dnsguard domain layer
pub mod bypass;
pub mod cache_policy;
pub mod config;
pub mod decision;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod interface;
pub mod manifest;
pub mod retry;
pub mod rule;
pub mod telemetry;
pub mod validators;

pub use bypass::{BypassGrant, BypassScope, CredentialKind, GrantId};
pub use cache_policy::{CachePolicy, CachePolicyTable, TtlResolution, FALLBACK_TTL_SECS};
pub use config::{CliOverrides, Config, ConfigError, ConfigSnapshot};
pub use decision::{Decision, DecisionSource, Verdict};
pub use dns_query::{DnsQuery, TransactionId};
pub use dns_record::{DnsAnswer, RecordType, ResponseStatus};
pub use errors::DomainError;
pub use interface::{InterfaceId, InterfaceKind, InterfaceStrategy, NetworkInterface};
pub use manifest::{ManifestDocument, ManifestFormat, RuleSourceDocument};
pub use retry::{RetryPolicy, RetryState, RetryStep};
pub use rule::{Rule, RuleAction, RulePattern, RuleSet};
pub use telemetry::{PrivacyLevel, QueryOutcomeTag, TelemetryEvent, TelemetryEventKind};
