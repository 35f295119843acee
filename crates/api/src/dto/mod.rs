pub mod bypass;
pub mod cache;
pub mod health;
pub mod rules;

pub use bypass::{BypassRequest, GrantResponse};
pub use cache::{CacheBypassRequest, CacheStatsResponse, FlushResponse, SetTtlRequest};
pub use health::HealthResponse;
pub use rules::ReplaceRulesResponse;
