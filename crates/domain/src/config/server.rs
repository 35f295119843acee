use serde::{Deserialize, Serialize};

/// Control channel (HTTP API) binding
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Serve the control API at all (default: true)
    #[serde(default = "default_true")]
    pub control_enabled: bool,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_control_port")]
    pub control_port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_control_port() -> u16 {
    8765
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            control_enabled: true,
            bind_address: default_bind_address(),
            control_port: default_control_port(),
            cors_allowed_origins: default_cors_origins(),
        }
    }
}
