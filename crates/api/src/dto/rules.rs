use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct ReplaceRulesResponse {
    pub rule_count: usize,
    pub origin: Option<String>,
}
