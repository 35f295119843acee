pub mod bypass;
pub mod cache;
pub mod config;
pub mod pipeline;
pub mod rules;

pub use bypass::{BypassController, BypassSettings};
pub use cache::CacheControlUseCase;
pub use config::ReloadConfigUseCase;
pub use pipeline::{DecisionPipeline, QueryOutcome};
pub use rules::ReplaceRulesUseCase;
