use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rule_count: usize,
    pub rule_origin: Option<String>,
    pub cache_entries: usize,
    pub active_grants: usize,
    pub telemetry_dropped: u64,
}
