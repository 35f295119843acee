//! Bounded, non-blocking telemetry queue.
//!
//! `emit` only pushes onto a `VecDeque` under a short lock. When the queue is
//! full the oldest event is discarded and counted. Redaction happens on the
//! drain side, so the query path never hashes.

use super::redaction::{redact_domain, resolve_client_id};
use arc_swap::ArcSwap;
use chrono::Utc;
use dnsguard_application::ports::{Reconfigurable, TelemetryPort, TelemetryRecord, TelemetrySink};
use dnsguard_domain::config::TelemetryConfig;
use dnsguard_domain::{ConfigSnapshot, DomainError, PrivacyLevel, TelemetryEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub verbose: bool,
    pub privacy: PrivacyLevel,
    pub capacity: usize,
    pub client_id: Arc<str>,
}

impl TelemetrySettings {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            enabled: config.enabled,
            verbose: config.verbose,
            privacy: config.privacy_level,
            capacity: config.queue_capacity.max(1),
            client_id: Arc::from(resolve_client_id(config.client_identifier.as_deref())),
        }
    }
}

pub struct TelemetryEmitter {
    queue: Mutex<VecDeque<TelemetryEvent>>,
    notify: Notify,
    dropped: AtomicU64,
    delivered: AtomicU64,
    settings: ArcSwap<TelemetrySettings>,
}

impl TelemetryEmitter {
    pub fn new(settings: TelemetrySettings) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(settings.capacity.min(4096))),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            settings: ArcSwap::from_pointee(settings),
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(TelemetrySettings::from_config(config))
    }

    pub fn settings(&self) -> Arc<TelemetrySettings> {
        self.settings.load_full()
    }

    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<TelemetryEvent>> {
        // A panic while holding the lock leaves a valid VecDeque behind.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Resolves once events have been queued since the last drain.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    fn redact(&self, event: TelemetryEvent, settings: &TelemetrySettings) -> TelemetryRecord {
        TelemetryRecord {
            name: event.name(),
            domain: event
                .domain
                .as_deref()
                .map(|d| redact_domain(d, settings.privacy)),
            kind: event.kind,
            privacy: settings.privacy,
            client_id: Arc::clone(&settings.client_id),
            emitted_at: Utc::now(),
        }
    }

    /// Delivers everything currently queued. Sink errors are logged and the
    /// record is dropped. Returns how many records were handed to the sink.
    pub async fn drain(&self, sink: &dyn TelemetrySink) -> usize {
        let batch: Vec<TelemetryEvent> = self.lock_queue().drain(..).collect();
        if batch.is_empty() {
            return 0;
        }

        let settings = self.settings.load_full();
        let mut delivered = 0;
        for event in batch {
            let record = self.redact(event, &settings);
            match sink.deliver(&record).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(event = record.name, error = %e, "Telemetry delivery failed"),
            }
        }

        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        debug!(delivered, "Telemetry batch drained");
        delivered
    }

    /// Spawns the delivery task. It wakes whenever events are queued and
    /// flushes what is left on cancellation.
    pub fn spawn_drain(
        self: Arc<Self>,
        sink: Arc<dyn TelemetrySink>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        info!(client = %self.settings.load().client_id, "Starting telemetry drain");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        self.drain(sink.as_ref()).await;
                        info!(dropped = self.dropped(), "Telemetry drain stopped");
                        break;
                    }
                    _ = self.notified() => {
                        self.drain(sink.as_ref()).await;
                    }
                }
            }
        })
    }
}

impl TelemetryPort for TelemetryEmitter {
    fn emit(&self, event: TelemetryEvent) {
        let settings = self.settings.load();
        if !settings.enabled {
            return;
        }

        {
            let mut queue = self.lock_queue();
            while queue.len() >= settings.capacity {
                queue.pop_front();
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            queue.push_back(event);
        }
        self.notify.notify_one();
    }

    fn is_verbose(&self) -> bool {
        let settings = self.settings.load();
        settings.enabled && settings.verbose
    }

    fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Reconfigurable for TelemetryEmitter {
    fn component(&self) -> &'static str {
        "telemetry"
    }

    fn apply(&self, snapshot: &ConfigSnapshot) -> Result<(), DomainError> {
        let settings = TelemetrySettings::from_config(&snapshot.config.telemetry);
        if !settings.enabled {
            self.lock_queue().clear();
        }
        self.settings.store(Arc::new(settings));
        Ok(())
    }
}

impl std::fmt::Debug for TelemetryEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settings = self.settings.load();
        f.debug_struct("TelemetryEmitter")
            .field("enabled", &settings.enabled)
            .field("privacy", &settings.privacy)
            .field("dropped", &self.dropped())
            .finish()
    }
}
