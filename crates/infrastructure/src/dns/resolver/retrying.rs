//! Upstream resolution with interface selection and bounded retries.
//!
//! One `RetryState` and one `TransactionBinding` live on the stack of each
//! `resolve` call; the only shared state is the configuration snapshot.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dnsguard_application::ports::{
    Clock, InterfaceSelectorPort, Reconfigurable, Resolution, ResolverPort, TelemetryPort,
    TransactionBinding, UpstreamTransport,
};
use dnsguard_domain::{
    ConfigSnapshot, DnsQuery, DomainError, RetryPolicy, RetryState, RetryStep, TelemetryEvent,
    TelemetryEventKind,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct ResolverSettings {
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

pub struct RetryingResolver {
    selector: Arc<dyn InterfaceSelectorPort>,
    transport: Arc<dyn UpstreamTransport>,
    telemetry: Arc<dyn TelemetryPort>,
    clock: Arc<dyn Clock>,
    settings: ArcSwap<ResolverSettings>,
}

impl RetryingResolver {
    pub fn new(
        selector: Arc<dyn InterfaceSelectorPort>,
        transport: Arc<dyn UpstreamTransport>,
        telemetry: Arc<dyn TelemetryPort>,
        clock: Arc<dyn Clock>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            selector,
            transport,
            telemetry,
            clock,
            settings: ArcSwap::from_pointee(ResolverSettings {
                policy,
                attempt_timeout,
            }),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.settings.load().policy
    }

    /// Per-attempt budget, shortened so the attempt cannot outlive `deadline`.
    fn attempt_budget(&self, attempt_timeout: Duration, deadline: Option<Instant>) -> Duration {
        match deadline {
            Some(deadline) => attempt_timeout.min(deadline.saturating_duration_since(self.clock.now())),
            None => attempt_timeout,
        }
    }

    fn emit_attempt(&self, attempt: u32, interface: &dnsguard_domain::InterfaceId, success: bool) {
        if self.telemetry.is_verbose() {
            self.telemetry.emit(TelemetryEvent::new(TelemetryEventKind::ResolutionAttempt {
                attempt,
                interface: interface.clone(),
                success,
            }));
        }
    }
}

fn give_up(attempts: u32, last_error: Option<DomainError>) -> DomainError {
    match last_error {
        Some(DomainError::TransportTimeout { .. }) | None => DomainError::ResolutionTimeout { attempts },
        Some(other) => DomainError::ResolutionUnreachable {
            attempts,
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl ResolverPort for RetryingResolver {
    async fn resolve(
        &self,
        query: &DnsQuery,
        deadline: Option<Instant>,
    ) -> Result<Resolution, DomainError> {
        let settings = **self.settings.load();
        let mut state = RetryState::new(settings.policy, deadline);
        let mut binding =
            TransactionBinding::new(query.transaction_id, self.selector.sticky_by_default());
        let mut last_error: Option<DomainError> = None;

        while let Some(attempt) = state.begin_attempt() {
            let interface = self.selector.select(query, &mut binding)?;

            let server = interface
                .resolver_for_attempt(attempt - 1)
                .ok_or(DomainError::NoInterfaceAvailable)?;

            let budget = self.attempt_budget(settings.attempt_timeout, deadline);
            if budget.is_zero() {
                return Err(give_up(attempt - 1, last_error));
            }

            debug!(
                domain = %query.domain,
                transaction = %query.transaction_id,
                attempt,
                interface = %interface.id,
                server = %server,
                "Resolution attempt"
            );

            match self.transport.exchange(query, &interface, server, budget).await {
                Ok(answer) => {
                    self.emit_attempt(attempt, &interface.id, true);
                    return Ok(Resolution {
                        answer,
                        interface: Some(interface.id),
                        attempts: attempt,
                    });
                }
                Err(e) if e.is_transient() => {
                    self.emit_attempt(attempt, &interface.id, false);
                    warn!(
                        domain = %query.domain,
                        attempt,
                        interface = %interface.id,
                        error = %e,
                        "Upstream attempt failed"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    self.emit_attempt(attempt, &interface.id, false);
                    return Err(e);
                }
            }

            match state.on_failure(self.clock.now()) {
                RetryStep::Retry { backoff, next_attempt } => {
                    debug!(domain = %query.domain, next_attempt, backoff_ms = backoff.as_millis() as u64, "Backing off");
                    tokio::time::sleep(backoff).await;
                }
                RetryStep::Exhausted { attempts } | RetryStep::DeadlineReached { attempts } => {
                    return Err(give_up(attempts, last_error));
                }
            }
        }

        Err(give_up(state.attempts(), last_error))
    }
}

impl Reconfigurable for RetryingResolver {
    fn component(&self) -> &'static str {
        "resolver"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        let interfaces = &snapshot.config.interfaces;
        self.settings.store(Arc::new(ResolverSettings {
            policy: interfaces.retry_policy(),
            attempt_timeout: Duration::from_millis(interfaces.attempt_timeout_ms),
        }));
        Ok(())
    }
}
