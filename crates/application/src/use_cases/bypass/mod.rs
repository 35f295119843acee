mod controller;
mod settings;

pub use controller::BypassController;
pub use settings::BypassSettings;
