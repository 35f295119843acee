use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dnsguard_domain::{DomainError, PrivacyLevel, TelemetryEvent, TelemetryEventKind};
use std::sync::Arc;

/// Fire-and-forget event intake.
pub trait TelemetryPort: Send + Sync {
    /// Never blocks and never fails. Events may be dropped.
    fn emit(&self, event: TelemetryEvent);

    /// Whether per-attempt events are wanted.
    fn is_verbose(&self) -> bool;

    fn dropped(&self) -> u64;
}

/// An event after privacy redaction, ready to leave the process.
#[derive(Debug, Clone)]
pub struct TelemetryRecord {
    pub name: &'static str,
    pub kind: TelemetryEventKind,
    /// Domain as allowed by `privacy`: full name, hash prefix or last label.
    pub domain: Option<String>,
    pub privacy: PrivacyLevel,
    pub client_id: Arc<str>,
    pub emitted_at: DateTime<Utc>,
}

/// Delivery side of telemetry. Failures are logged by the caller and dropped.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), DomainError>;
}
