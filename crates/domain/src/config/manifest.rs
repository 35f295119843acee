use crate::ManifestFormat;
use serde::{Deserialize, Serialize};

/// Where rule sources come from and how often they are re-read
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestConfig {
    /// Manifest identifier expected in refreshed documents
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Local manifest file. Populated by whatever fetches the remote copy.
    #[serde(default)]
    pub path: Option<String>,

    /// Remote location, informational only (fetching is external)
    #[serde(default)]
    pub url: Option<String>,

    /// Document format. Defaults to the file extension, then JSON.
    #[serde(default)]
    pub format: Option<ManifestFormat>,

    /// Refresh interval in seconds (default: 300)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
}

fn default_identifier() -> String {
    "default".to_string()
}

fn default_update_interval() -> u64 {
    300
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            path: None,
            url: None,
            format: None,
            update_interval_secs: default_update_interval(),
        }
    }
}

impl ManifestConfig {
    pub fn effective_format(&self) -> ManifestFormat {
        self.format.unwrap_or_else(|| {
            ManifestFormat::from_extension(
                self.path
                    .as_deref()
                    .and_then(|p| std::path::Path::new(p).extension())
                    .and_then(|e| e.to_str()),
            )
        })
    }
}
