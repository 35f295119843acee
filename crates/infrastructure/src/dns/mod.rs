pub mod cache;
pub mod forwarding;
pub mod interfaces;
pub mod resolver;
pub mod rules;
pub mod transport;

pub use cache::ResponseCache;
pub use interfaces::InterfaceSelector;
pub use resolver::RetryingResolver;
pub use rules::RuleStore;
pub use transport::UdpTransport;
