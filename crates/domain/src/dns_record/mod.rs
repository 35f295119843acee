pub mod answer;
pub mod record_type;

pub use answer::{DnsAnswer, ResponseStatus};
pub use record_type::RecordType;
