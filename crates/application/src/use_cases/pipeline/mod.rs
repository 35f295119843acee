mod decision_pipeline;
mod outcome;

pub use decision_pipeline::DecisionPipeline;
pub use outcome::QueryOutcome;
