use dnsguard_domain::{DnsQuery, RecordType};
use std::sync::Arc;

/// Cache key. Shares the query's `Arc<str>`, so building one never allocates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: Arc<str>, record_type: RecordType) -> Self {
        Self {
            domain,
            record_type,
        }
    }

    #[inline]
    pub fn for_query(query: &DnsQuery) -> Self {
        Self::new(Arc::clone(&query.domain), query.record_type)
    }
}
