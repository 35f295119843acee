#[path = "../common/mod.rs"]
mod common;

use common::*;
use dnsguard_application::ports::ResponseCachePort;
use dnsguard_domain::{DomainError, InterfaceId, QueryOutcomeTag};
use std::time::Duration;

const TWO_INTERFACES: &str = r#"
[interfaces]
binding_enabled = true
strategy = "round_robin"
sticky_per_transaction = true
max_retries = 3
initial_backoff_ms = 100
max_backoff_ms = 2000

[[interfaces.interfaces]]
id = "wan"
kind = "physical"
resolvers = ["192.0.2.1:53", "192.0.2.2:53"]

[[interfaces.interfaces]]
id = "vpn"
kind = "vpn"
resolvers = ["10.8.0.1:53"]
"#;

// ============================================================================
// Retry and backoff
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_backs_off_100_then_200() {
    // Arrange
    let h = Harness::from_toml("");
    h.transport.fail_times(2);

    // Act
    let outcome = h.pipeline.handle(query(TestDomains::example())).await;

    // Assert
    assert_eq!(outcome.tag, QueryOutcomeTag::Resolved);
    assert_eq!(outcome.attempts, 3);
    let at: Vec<_> = h.transport.exchanges().iter().map(|e| e.at).collect();
    assert_eq!(at.len(), 3);
    assert_eq!(at[1] - at[0], Duration::from_millis(100));
    assert_eq!(at[2] - at[1], Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_fail_and_leave_cache_untouched() {
    let h = Harness::from_toml("");
    h.transport.fail_times(3);
    let q = query(TestDomains::example());

    let outcome = h.pipeline.handle(q.clone()).await;

    assert_eq!(outcome.tag, QueryOutcomeTag::Failed);
    assert!(matches!(
        outcome.error,
        Some(DomainError::ResolutionTimeout { attempts: 3 })
    ));
    assert_eq!(h.transport.exchange_count(), 3);
    assert!(h.cache.lookup(&q).is_none());

    let retry = h.pipeline.handle(q).await;
    assert_eq!(retry.tag, QueryOutcomeTag::Resolved);
}

#[tokio::test(start_paused = true)]
async fn test_servfail_is_returned_but_not_cached() {
    let h = Harness::from_toml("");
    h.transport.push(Ok(servfail()));
    let q = query(TestDomains::example());

    let outcome = h.pipeline.handle(q.clone()).await;

    assert_eq!(outcome.tag, QueryOutcomeTag::Resolved);
    assert!(outcome.answer.unwrap().is_server_error());
    assert!(h.cache.lookup(&q).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_query_deadline_cuts_slow_upstream() {
    // Arrange
    let h = Harness::from_toml(
        r#"
[interfaces]
query_timeout_ms = 300
attempt_timeout_ms = 1500
"#,
    );
    h.transport.set_delay(Duration::from_secs(10));

    // Act
    let outcome = h.pipeline.handle(query(TestDomains::example())).await;

    // Assert
    assert_eq!(outcome.tag, QueryOutcomeTag::Failed);
    assert!(matches!(outcome.error, Some(DomainError::DeadlineExceeded(_))));
    assert!(outcome.latency <= Duration::from_millis(300));
}

// ============================================================================
// Interface binding
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sticky_transaction_retries_on_first_interface() {
    let h = Harness::from_toml(TWO_INTERFACES);
    h.transport.fail_times(2);

    let outcome = h.pipeline.handle(query(TestDomains::example())).await;

    assert_eq!(outcome.tag, QueryOutcomeTag::Resolved);
    let exchanges = h.transport.exchanges();
    assert_eq!(exchanges.len(), 3);
    assert!(exchanges.iter().all(|e| e.interface == exchanges[0].interface));
    assert_eq!(outcome.interface, Some(exchanges[0].interface.clone()));
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_interface_is_skipped() {
    let config = TWO_INTERFACES
        .replace("round_robin", "preferred_first")
        .replace("max_retries = 3", "max_retries = 3\npreferred = [\"wan\", \"vpn\"]");
    let h = Harness::from_toml(&config);

    h.selector.set_available(&InterfaceId::new("wan"), false);
    let outcome = h.pipeline.handle(query(TestDomains::example())).await;

    assert_eq!(outcome.interface.unwrap().as_str(), "vpn");
    assert_eq!(h.transport.exchanges()[0].server, "10.8.0.1:53".parse().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_no_available_interface_fails_without_exchange() {
    let h = Harness::from_toml(TWO_INTERFACES);
    h.selector.set_available(&InterfaceId::new("wan"), false);
    h.selector.set_available(&InterfaceId::new("vpn"), false);

    let outcome = h.pipeline.handle(query(TestDomains::example())).await;

    assert_eq!(outcome.tag, QueryOutcomeTag::Failed);
    assert!(matches!(outcome.error, Some(DomainError::NoInterfaceAvailable)));
    assert_eq!(h.transport.exchange_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_binding_disabled_uses_single_default_path() {
    let h = Harness::from_toml(&TWO_INTERFACES.replace(
        "binding_enabled = true",
        "binding_enabled = false",
    ));
    h.transport.fail_times(2);

    h.pipeline.handle(query(TestDomains::example())).await;

    assert!(h
        .transport
        .exchanges()
        .iter()
        .all(|e| e.interface.as_str() == "default"));
}
