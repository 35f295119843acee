pub mod bypass;
pub mod cache;
pub mod health;
pub mod rules;

pub use bypass::{create_bypass, list_bypass, revoke_bypass};
pub use cache::{add_cache_bypass, flush_cache, get_cache_stats, set_cache_ttl};
pub use health::health_check;
pub use rules::replace_rules;
