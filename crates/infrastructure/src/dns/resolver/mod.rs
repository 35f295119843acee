pub mod retrying;

pub use retrying::RetryingResolver;
