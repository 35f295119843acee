use crate::PrivacyLevel;
use serde::{Deserialize, Serialize};

/// Telemetry emission settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub privacy_level: PrivacyLevel,

    /// Adds per-attempt resolver events
    #[serde(default)]
    pub verbose: bool,

    /// Bounded queue size; oldest events are dropped beyond it
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Identifier attached to every event. Defaults to the host name.
    #[serde(default)]
    pub client_identifier: Option<String>,

    /// Ingestion endpoint for the external transport (informational)
    #[serde(default)]
    pub server_url: Option<String>,
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            privacy_level: PrivacyLevel::default(),
            verbose: false,
            queue_capacity: default_queue_capacity(),
            client_identifier: None,
            server_url: None,
        }
    }
}
