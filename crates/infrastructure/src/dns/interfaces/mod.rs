mod selector;
mod strategy;

pub use selector::InterfaceSelector;
pub use strategy::{PreferredFirstStrategy, RoundRobinStrategy, Strategy, VpnAwareStrategy};
