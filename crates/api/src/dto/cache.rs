use dnsguard_application::ports::CacheStats;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone)]
pub struct CacheStatsResponse {
    pub enabled: bool,
    pub total_entries: usize,
    pub capacity: usize,
    pub default_ttl_secs: u32,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub skipped: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            enabled: stats.enabled,
            total_entries: stats.entries,
            capacity: stats.capacity,
            default_ttl_secs: stats.default_ttl_secs,
            hits: stats.hits,
            misses: stats.misses,
            insertions: stats.insertions,
            skipped: stats.skipped,
            evictions: stats.evictions,
            expirations: stats.expirations,
            hit_rate: stats.hit_rate,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SetTtlRequest {
    /// Omitted changes the global default.
    #[serde(default)]
    pub domain: Option<String>,
    pub ttl_secs: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CacheBypassRequest {
    pub domain: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct FlushResponse {
    pub removed: usize,
}
