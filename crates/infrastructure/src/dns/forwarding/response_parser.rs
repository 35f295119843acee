use bytes::Bytes;
use dnsguard_domain::{DnsAnswer, DomainError, ResponseStatus};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// The parts of an upstream reply the resolver acts on.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub id: u16,
    pub status: ResponseStatus,
    pub truncated: bool,
    pub addresses: Vec<IpAddr>,
    pub cname_chain: Vec<Arc<str>>,
    /// Smallest TTL in the answer section.
    pub min_ttl: Option<u32>,
    pub wire: Bytes,
}

impl ParsedResponse {
    pub fn into_answer(self) -> DnsAnswer {
        let mut answer = DnsAnswer::new(self.addresses).with_cname_chain(self.cname_chain);
        answer.status = self.status;
        answer.wire = Some(Arc::from(&self.wire[..]));
        match self.min_ttl {
            Some(ttl) => answer.with_upstream_ttl(ttl),
            None => answer,
        }
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(wire: Bytes) -> Result<ParsedResponse, DomainError> {
        let message = Message::from_vec(&wire).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("undecodable upstream reply: {e}"))
        })?;

        let records = message.answers();
        let addresses: Vec<IpAddr> = records
            .iter()
            .filter_map(|r| match r.data() {
                RData::A(v4) => Some(IpAddr::V4(v4.0)),
                RData::AAAA(v6) => Some(IpAddr::V6(v6.0)),
                _ => None,
            })
            .collect();
        let cname_chain: Vec<Arc<str>> = records
            .iter()
            .filter_map(|r| match r.data() {
                RData::CNAME(target) => Some(Arc::from(target.to_utf8().trim_end_matches('.'))),
                _ => None,
            })
            .collect();

        let parsed = ParsedResponse {
            id: message.id(),
            status: Self::rcode_to_status(message.response_code()),
            truncated: message.truncated(),
            addresses,
            cname_chain,
            min_ttl: records.iter().map(|r| r.ttl()).min(),
            wire,
        };

        debug!(
            status = parsed.status.as_str(),
            answers = parsed.addresses.len(),
            cnames = parsed.cname_chain.len(),
            truncated = parsed.truncated,
            "Upstream reply decoded"
        );
        Ok(parsed)
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> ResponseStatus {
        match rcode {
            ResponseCode::NoError => ResponseStatus::NoError,
            ResponseCode::NXDomain => ResponseStatus::NxDomain,
            ResponseCode::ServFail => ResponseStatus::ServFail,
            ResponseCode::Refused => ResponseStatus::Refused,
            _ => ResponseStatus::Other,
        }
    }
}
