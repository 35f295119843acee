use crate::ports::{BypassGrantStore, Clock, Reconfigurable, TelemetryPort};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use dnsguard_domain::{
    BypassGrant, BypassScope, ConfigSnapshot, CredentialKind, DomainError, GrantId,
    TelemetryEvent, TelemetryEventKind,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use super::BypassSettings;

#[derive(Debug, Default)]
struct AttemptState {
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    locked_until: Option<Instant>,
}

impl AttemptState {
    fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Nothing worth remembering: not locked, and the last failure is at
    /// least `window` old.
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        !self.is_locked(now)
            && self
                .last_failure
                .map_or(true, |at| now.saturating_duration_since(at) >= window)
    }

    fn refresh(&mut self, now: Instant, window: Duration) {
        if self.is_stale(now, window) {
            *self = Self::default();
        }
    }

    /// Counts a failure; true when it starts a lockout.
    fn record_failure(&mut self, now: Instant, limit: u32, lockout: Duration) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure = Some(now);
        if self.consecutive_failures >= limit && !self.is_locked(now) {
            self.locked_until = Some(now + lockout);
            return true;
        }
        false
    }
}

/// Authenticated issuing and revocation of temporary allow grants.
///
/// Failed attempts are counted per caller identity (the peer address on
/// the control channel) and across all callers. Either limit locks the
/// affected callers out for `lockout`; failures older than that are
/// forgotten. The identity's map entry is held for the whole check, which
/// serializes concurrent attempts from the same identity.
pub struct BypassController {
    grants: Arc<dyn BypassGrantStore>,
    telemetry: Arc<dyn TelemetryPort>,
    clock: Arc<dyn Clock>,
    settings: ArcSwap<BypassSettings>,
    attempts: DashMap<String, AttemptState>,
    global: Mutex<AttemptState>,
    next_id: AtomicU64,
}

impl BypassController {
    pub fn new(
        grants: Arc<dyn BypassGrantStore>,
        telemetry: Arc<dyn TelemetryPort>,
        clock: Arc<dyn Clock>,
        settings: BypassSettings,
    ) -> Self {
        Self {
            grants,
            telemetry,
            clock,
            settings: ArcSwap::from_pointee(settings),
            attempts: DashMap::new(),
            global: Mutex::new(AttemptState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    fn global_state(&self) -> MutexGuard<'_, AttemptState> {
        self.global.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `verify` under both failure limits.
    ///
    /// Every rejection is the same `AuthenticationFailed`, whether the
    /// credential was wrong or the caller is locked out. During lockout
    /// `verify` is not called.
    fn attempt<T>(
        &self,
        identity: &str,
        verify: impl FnOnce(&BypassSettings) -> Option<T>,
    ) -> Result<T, DomainError> {
        let settings = self.settings.load();
        let now = self.clock.now();
        let window = settings.lockout;

        let (result, locked_out) = {
            let mut state = self.attempts.entry(identity.to_string()).or_default();
            state.refresh(now, window);
            let globally_locked = {
                let mut global = self.global_state();
                global.refresh(now, window);
                global.is_locked(now)
            };

            if state.is_locked(now) || globally_locked {
                (None, true)
            } else {
                match verify(&settings) {
                    Some(value) => (Some(value), false),
                    None => {
                        if state.record_failure(now, settings.max_failed_attempts, settings.lockout) {
                            warn!(
                                failures = state.consecutive_failures,
                                lockout_secs = settings.lockout.as_secs(),
                                "Bypass identity locked out"
                            );
                        }
                        let mut global = self.global_state();
                        if global.record_failure(now, settings.max_failed_total, settings.lockout) {
                            warn!(
                                failures = global.consecutive_failures,
                                lockout_secs = settings.lockout.as_secs(),
                                "Bypass locked out for all callers"
                            );
                        }
                        (None, false)
                    }
                }
            }
        };

        match result {
            Some(value) => {
                self.attempts.remove(identity);
                Ok(value)
            }
            None => {
                self.attempts
                    .remove_if(identity, |_, s| s.consecutive_failures == 0);
                self.telemetry.emit(TelemetryEvent::new(TelemetryEventKind::BypassRejected {
                    locked_out,
                }));
                Err(DomainError::AuthenticationFailed)
            }
        }
    }

    /// Checks `credential` (password or control token) for `identity`.
    #[instrument(skip(self, credential))]
    pub fn authenticate(&self, identity: &str, credential: &str) -> Result<CredentialKind, DomainError> {
        self.attempt(identity, |settings| settings.verify(credential))
    }

    /// Checks the control token presented on a protected route. Shares the
    /// failure limits with [`authenticate`](Self::authenticate).
    #[instrument(skip(self, presented))]
    pub fn authorize_control(&self, identity: &str, presented: &str) -> Result<(), DomainError> {
        self.attempt(identity, |settings| settings.verify_token(presented).then_some(()))
    }

    /// Whether `identity` is currently locked out, on its own count or
    /// through the global one.
    pub fn is_locked_out(&self, identity: &str) -> bool {
        let now = self.clock.now();
        let own = self
            .attempts
            .get(identity)
            .is_some_and(|s| s.is_locked(now));
        own || self.global_state().is_locked(now)
    }

    /// Identities with failures still remembered.
    pub fn tracked_identities(&self) -> usize {
        self.attempts.len()
    }

    /// Installs a grant. The TTL is clamped to the configured maximum; the
    /// grant affects rule evaluation as soon as this returns.
    pub fn grant(
        &self,
        scope: BypassScope,
        ttl: Option<Duration>,
        credential: CredentialKind,
    ) -> BypassGrant {
        let ttl = self.settings.load().clamp_ttl(ttl);
        let id = GrantId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let grant = BypassGrant::new(id, scope, self.clock.now(), ttl, credential);

        self.grants.insert_grant(grant.clone());

        info!(
            grant_id = %grant.id,
            scope = %grant.scope,
            ttl_secs = ttl.as_secs(),
            credential = credential.as_str(),
            "Bypass granted"
        );
        let kind = TelemetryEventKind::BypassGranted {
            grant_id: grant.id,
            covers_all: matches!(grant.scope, BypassScope::All),
            ttl_secs: ttl.as_secs(),
            credential,
        };
        let event = match &grant.scope {
            BypassScope::Domain(domain) => TelemetryEvent::for_domain(kind, domain),
            BypassScope::All => TelemetryEvent::new(kind),
        };
        self.telemetry.emit(event);

        grant
    }

    /// Authenticates then grants.
    pub fn request(
        &self,
        identity: &str,
        credential: &str,
        scope: BypassScope,
        ttl: Option<Duration>,
    ) -> Result<BypassGrant, DomainError> {
        let kind = self.authenticate(identity, credential)?;
        Ok(self.grant(scope, ttl, kind))
    }

    pub fn revoke(&self, id: GrantId) -> Result<BypassGrant, DomainError> {
        let grant = self
            .grants
            .revoke_grant(id)
            .ok_or_else(|| DomainError::GrantNotFound(id.to_string()))?;

        info!(grant_id = %id, "Bypass revoked");
        self.telemetry
            .emit(TelemetryEvent::new(TelemetryEventKind::BypassRevoked { grant_id: id }));
        Ok(grant)
    }

    pub fn active_grants(&self) -> Vec<BypassGrant> {
        self.grants.active_grants(self.clock.now())
    }

    /// Drops expired grants along with failure counts and lockouts that
    /// have run their course.
    pub fn reap_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.settings.load().lockout;
        self.attempts.retain(|_, s| !s.is_stale(now, window));
        self.global_state().refresh(now, window);
        self.grants.purge_expired(now)
    }

    pub fn remaining(&self, grant: &BypassGrant) -> Duration {
        grant.remaining(self.clock.now())
    }
}

impl Reconfigurable for BypassController {
    fn component(&self) -> &'static str {
        "bypass"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        self.settings
            .store(Arc::new(BypassSettings::from_config(&snapshot.config.bypass)));
        Ok(())
    }
}
