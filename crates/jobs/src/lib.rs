pub mod cache_sweep;
pub mod grant_reaper;
pub mod manifest_refresh;
pub mod runner;

pub use cache_sweep::CacheSweepJob;
pub use grant_reaper::GrantReaperJob;
pub use manifest_refresh::ManifestRefreshJob;
pub use runner::JobRunner;
