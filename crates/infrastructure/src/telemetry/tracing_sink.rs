use async_trait::async_trait;
use dnsguard_application::ports::{TelemetryRecord, TelemetrySink};
use dnsguard_domain::{DomainError, TelemetryEventKind};
use tracing::info;

/// Writes each record as a structured `tracing` event under the
/// `dnsguard::telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl TelemetrySink for TracingSink {
    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), DomainError> {
        let domain = record.domain.as_deref().unwrap_or("-");
        let at = record.emitted_at.to_rfc3339();

        match &record.kind {
            TelemetryEventKind::QueryCompleted {
                outcome,
                record_type,
                decision,
                latency_us,
                interface,
            } => info!(
                target: "dnsguard::telemetry",
                event = record.name,
                client = %record.client_id,
                at = %at,
                domain,
                outcome = outcome.as_str(),
                record_type = record_type.as_str(),
                decision,
                latency_us,
                interface = interface.as_ref().map(|i| i.as_str()).unwrap_or("-"),
            ),
            TelemetryEventKind::ResolutionAttempt {
                attempt,
                interface,
                success,
            } => info!(
                target: "dnsguard::telemetry",
                event = record.name,
                client = %record.client_id,
                at = %at,
                domain,
                attempt,
                interface = interface.as_str(),
                success,
            ),
            other => info!(
                target: "dnsguard::telemetry",
                event = record.name,
                client = %record.client_id,
                at = %at,
                domain,
                privacy = record.privacy.as_str(),
                detail = ?other,
            ),
        }
        Ok(())
    }
}
