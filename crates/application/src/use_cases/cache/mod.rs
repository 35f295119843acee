mod control;

pub use control::CacheControlUseCase;
