use crate::ports::{RuleEvaluatorPort, TelemetryPort};
use dnsguard_domain::{DomainError, ManifestDocument, TelemetryEvent, TelemetryEventKind};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Applies a refreshed manifest to the rule store.
///
/// The document is validated as a whole before anything is swapped; a
/// rejection keeps the last good rule set in force.
pub struct ReplaceRulesUseCase {
    rules: Arc<dyn RuleEvaluatorPort>,
    telemetry: Arc<dyn TelemetryPort>,
}

impl ReplaceRulesUseCase {
    pub fn new(rules: Arc<dyn RuleEvaluatorPort>, telemetry: Arc<dyn TelemetryPort>) -> Self {
        Self { rules, telemetry }
    }

    /// `expected_identifier`, when given, must match the document's.
    #[instrument(skip(self, document), fields(identifier = %document.identifier))]
    pub fn execute(
        &self,
        document: &ManifestDocument,
        expected_identifier: Option<&str>,
    ) -> Result<usize, DomainError> {
        let result = match expected_identifier {
            Some(expected) if expected != document.identifier => {
                Err(DomainError::ManifestRejected(format!(
                    "manifest identifier '{}' does not match expected '{}'",
                    document.identifier, expected
                )))
            }
            _ => self.rules.replace_from_manifest(document),
        };

        match result {
            Ok(rule_count) => {
                let origin = self.rules.origin();
                info!(rule_count, origin = ?origin, "Rule set replaced");
                self.telemetry
                    .emit(TelemetryEvent::new(TelemetryEventKind::RulesReplaced {
                        origin,
                        rule_count,
                    }));
                Ok(rule_count)
            }
            Err(e) => {
                warn!(error = %e, "Manifest rejected, keeping previous rules");
                self.telemetry
                    .emit(TelemetryEvent::new(TelemetryEventKind::ManifestRejected {
                        reason: e.to_string(),
                    }));
                Err(e)
            }
        }
    }
}
