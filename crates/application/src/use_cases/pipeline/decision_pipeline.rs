use crate::ports::{
    Clock, Reconfigurable, ResolverPort, ResponseCachePort, RuleEvaluatorPort, TelemetryPort,
};
use dnsguard_domain::{
    ConfigSnapshot, Decision, DnsQuery, DomainError, TelemetryEvent, TelemetryEventKind,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::QueryOutcome;

/// Orchestrates one query: rules, then cache, then resolution.
///
/// ```text
/// Received -> RuleEvaluated -> Blocked
///                           -> CacheCheck -> CacheHit
///                                         -> CacheMiss -> Resolving -> Resolved | Failed
/// ```
///
/// The rule store is always consulted before the cache, so a block rule
/// installed after an answer was cached still wins. The resolving state
/// runs under the per-query deadline, which also cuts short any backoff.
pub struct DecisionPipeline {
    rules: Arc<dyn RuleEvaluatorPort>,
    cache: Arc<dyn ResponseCachePort>,
    resolver: Arc<dyn ResolverPort>,
    telemetry: Arc<dyn TelemetryPort>,
    clock: Arc<dyn Clock>,
    query_timeout_ms: AtomicU64,
}

impl DecisionPipeline {
    pub fn new(
        rules: Arc<dyn RuleEvaluatorPort>,
        cache: Arc<dyn ResponseCachePort>,
        resolver: Arc<dyn ResolverPort>,
        telemetry: Arc<dyn TelemetryPort>,
        clock: Arc<dyn Clock>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            rules,
            cache,
            resolver,
            telemetry,
            clock,
            query_timeout_ms: AtomicU64::new(query_timeout.as_millis() as u64),
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms.load(Ordering::Relaxed))
    }

    #[instrument(skip(self, query), fields(domain = %query.domain, txid = %query.transaction_id))]
    pub async fn handle(&self, query: DnsQuery) -> QueryOutcome {
        let started = self.clock.now();
        let outcome = self.run(&query, started).await;
        let outcome = QueryOutcome {
            latency: self.clock.now().saturating_duration_since(started),
            ..outcome
        };
        self.report(&query, &outcome);
        outcome
    }

    async fn run(&self, query: &DnsQuery, started: std::time::Instant) -> QueryOutcome {
        let verdict = self.rules.evaluate(&query.domain);

        if verdict.decision.is_block() {
            debug!(source = ?verdict.source, "Query blocked");
            return QueryOutcome::blocked(verdict);
        }

        // Keyed on the name actually resolved.
        let target = match &verdict.decision {
            Decision::Rewrite(to) => query.retarget(to),
            _ => query.clone(),
        };

        if let Some(entry) = self.cache.lookup(&target) {
            debug!(ttl = entry.ttl_secs, target = %target.domain, "Cache hit");
            return QueryOutcome::cache_hit(verdict, entry.answer);
        }

        let timeout = self.query_timeout();
        let deadline = started + timeout;

        match tokio::time::timeout(timeout, self.resolver.resolve(&target, Some(deadline))).await {
            Ok(Ok(resolution)) => {
                if !resolution.answer.is_server_error() {
                    self.cache.store(&target, &resolution.answer);
                }
                QueryOutcome::resolved(
                    verdict,
                    resolution.answer,
                    resolution.interface,
                    resolution.attempts,
                )
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Resolution failed");
                QueryOutcome::failed(verdict, e)
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Query deadline exceeded");
                QueryOutcome::failed(verdict, DomainError::DeadlineExceeded(timeout))
            }
        }
    }

    fn report(&self, query: &DnsQuery, outcome: &QueryOutcome) {
        let kind = TelemetryEventKind::QueryCompleted {
            outcome: outcome.tag,
            record_type: query.record_type,
            decision: outcome.verdict.decision.as_str(),
            latency_us: outcome.latency.as_micros() as u64,
            interface: outcome.interface.clone(),
        };
        self.telemetry
            .emit(TelemetryEvent::for_domain(kind, &query.domain));
    }
}

impl Reconfigurable for DecisionPipeline {
    fn component(&self) -> &'static str {
        "pipeline"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        self.query_timeout_ms
            .store(snapshot.config.interfaces.query_timeout_ms, Ordering::Relaxed);
        Ok(())
    }
}
