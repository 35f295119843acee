use dnsguard_domain::{DnsAnswer, DomainError, InterfaceId, QueryOutcomeTag, Verdict};
use std::time::Duration;

/// Terminal result of one query through the pipeline.
///
/// Every query ends in exactly one of the four tags; failures carry the
/// error instead of propagating it.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub tag: QueryOutcomeTag,
    pub verdict: Verdict,
    pub answer: Option<DnsAnswer>,
    pub error: Option<DomainError>,
    pub interface: Option<InterfaceId>,
    pub attempts: u32,
    pub latency: Duration,
}

impl QueryOutcome {
    pub(super) fn blocked(verdict: Verdict) -> Self {
        Self::bare(QueryOutcomeTag::Blocked, verdict)
    }

    pub(super) fn cache_hit(verdict: Verdict, answer: DnsAnswer) -> Self {
        Self {
            answer: Some(answer),
            ..Self::bare(QueryOutcomeTag::CacheHit, verdict)
        }
    }

    pub(super) fn resolved(
        verdict: Verdict,
        answer: DnsAnswer,
        interface: Option<InterfaceId>,
        attempts: u32,
    ) -> Self {
        Self {
            answer: Some(answer),
            interface,
            attempts,
            ..Self::bare(QueryOutcomeTag::Resolved, verdict)
        }
    }

    pub(super) fn failed(verdict: Verdict, error: DomainError) -> Self {
        let attempts = match &error {
            DomainError::ResolutionTimeout { attempts }
            | DomainError::ResolutionUnreachable { attempts, .. } => *attempts,
            _ => 0,
        };
        Self {
            error: Some(error),
            attempts,
            ..Self::bare(QueryOutcomeTag::Failed, verdict)
        }
    }

    fn bare(tag: QueryOutcomeTag, verdict: Verdict) -> Self {
        Self {
            tag,
            verdict,
            answer: None,
            error: None,
            interface: None,
            attempts: 0,
            latency: Duration::ZERO,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.tag == QueryOutcomeTag::Blocked
    }
}
