//! Wire-format query construction.

use super::record_type_map::RecordTypeMapper;
use dnsguard_domain::{DomainError, RecordType};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Typical query size; the buffer grows for long names.
const QUERY_BUF_CAPACITY: usize = 512;

pub struct MessageBuilder;

impl MessageBuilder {
    /// One-question recursive query under a fresh random id. The id is
    /// returned so the transport can match the reply.
    pub fn build_query(domain: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), DomainError> {
        let name = Name::from_str(domain)
            .map_err(|e| DomainError::InvalidDomainName(format!("{domain}: {e}")))?;

        let mut question = Query::query(name, RecordTypeMapper::to_hickory(record_type));
        question.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(question);

        Ok((id, Self::encode(&message)?))
    }

    fn encode(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut wire = Vec::with_capacity(QUERY_BUF_CAPACITY);
        message
            .emit(&mut BinEncoder::new(&mut wire))
            .map_err(|e| DomainError::InvalidDnsResponse(format!("query encoding failed: {e}")))?;
        Ok(wire)
    }
}
