use dnsguard_domain::PrivacyLevel;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Hex characters kept from the SHA-256 digest at [`PrivacyLevel::Hashed`].
pub const HASH_PREFIX_LEN: usize = 16;

/// Applies `privacy` to a queried name.
///
/// `Minimal` keeps only the last label, so "ads.example.com" becomes "com".
pub fn redact_domain(domain: &str, privacy: PrivacyLevel) -> String {
    match privacy {
        PrivacyLevel::Full => domain.to_string(),
        PrivacyLevel::Hashed => {
            let digest = Sha256::digest(domain.as_bytes());
            let mut hex = String::with_capacity(HASH_PREFIX_LEN);
            for byte in digest.iter().take(HASH_PREFIX_LEN / 2) {
                let _ = write!(hex, "{byte:02x}");
            }
            hex
        }
        PrivacyLevel::Minimal => domain
            .trim_end_matches('.')
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Configured identifier, or the host name, or "unknown".
pub fn resolve_client_id(configured: Option<&str>) -> String {
    if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
