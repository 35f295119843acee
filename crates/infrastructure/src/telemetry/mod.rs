pub mod emitter;
pub mod redaction;
pub mod tracing_sink;

pub use emitter::{TelemetryEmitter, TelemetrySettings};
pub use redaction::{redact_domain, resolve_client_id};
pub use tracing_sink::TracingSink;
