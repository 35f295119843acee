#[path = "../common/mod.rs"]
mod common;

use common::*;
use dnsguard_application::ports::ResponseCachePort;
use dnsguard_domain::{Config, DomainError, QueryOutcomeTag};

fn current_config(h: &Harness) -> Config {
    h.reload.current().config.as_ref().clone()
}

// ============================================================================
// Config reload
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_disabling_cache_clears_entries() {
    // Arrange
    let h = Harness::from_toml("");
    let q = query(TestDomains::example());
    h.pipeline.handle(q.clone()).await;
    assert_eq!(h.cache_control.stats().entries, 1);

    // Act
    let mut config = current_config(&h);
    config.cache.enabled = false;
    let snapshot = h.reload.execute(config).unwrap();

    // Assert
    assert_eq!(snapshot.version, 2);
    assert_eq!(h.cache_control.stats().entries, 0);
    let outcome = h.pipeline.handle(q.clone()).await;
    assert_eq!(outcome.tag, QueryOutcomeTag::Resolved);
    assert!(h.cache.lookup(&q).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_config_is_rejected_without_side_effects() {
    let h = Harness::from_toml("");
    let mut config = current_config(&h);
    config.interfaces.max_retries = 0;
    config.blocking.blocked_domains = vec!["example.com".to_string()];

    let result = h.reload.execute(config);

    assert!(matches!(result, Err(DomainError::InvalidConfig(_))));
    assert_eq!(h.reload.current().version, 1);
    let outcome = h.pipeline.handle(query(TestDomains::example())).await;
    assert_eq!(outcome.tag, QueryOutcomeTag::Resolved);
}

#[tokio::test(start_paused = true)]
async fn test_reloaded_retry_policy_applies_to_next_query() {
    let h = Harness::from_toml("");
    let mut config = current_config(&h);
    config.interfaces.max_retries = 1;
    h.reload.execute(config).unwrap();
    h.transport.fail_times(1);

    let outcome = h.pipeline.handle(query(TestDomains::example())).await;

    assert_eq!(outcome.tag, QueryOutcomeTag::Failed);
    assert_eq!(h.transport.exchange_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reloaded_block_list_applies_immediately() {
    let h = Harness::from_toml("");
    assert_eq!(
        h.pipeline.handle(query(TestDomains::blocked_ad())).await.tag,
        QueryOutcomeTag::Resolved
    );

    let mut config = current_config(&h);
    config.blocking.blocked_domains = vec![TestDomains::blocked_ad().to_string()];
    h.reload.execute(config).unwrap();

    assert_eq!(
        h.pipeline.handle(query(TestDomains::blocked_ad())).await.tag,
        QueryOutcomeTag::Blocked
    );
}
