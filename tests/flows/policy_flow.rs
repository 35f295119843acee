#[path = "../common/mod.rs"]
mod common;

use common::*;
use dnsguard_application::ports::{ResponseCachePort, RuleEvaluatorPort};
use dnsguard_domain::{BypassScope, DecisionSource, ManifestFormat, QueryOutcomeTag};
use std::time::Duration;

const BLOCKING: &str = r#"
[blocking]
blocked_domains = ["ads.example.com", "tracker.malicious.net"]

[bypass]
password = "letmein"
default_grant_secs = 300
max_grant_secs = 3600
"#;

// ============================================================================
// Blocking
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_blocked_query_never_reaches_upstream_or_cache() {
    // Arrange
    let h = Harness::from_toml(BLOCKING);
    let q = query(TestDomains::blocked_ad());

    // Act
    let outcome = h.pipeline.handle(q.clone()).await;

    // Assert
    assert_eq!(outcome.tag, QueryOutcomeTag::Blocked);
    assert!(outcome.answer.is_none());
    assert_eq!(h.transport.exchange_count(), 0);
    assert!(h.cache.lookup(&q).is_none());
    assert_eq!(h.cache_control.stats().entries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_block_rule_wins_over_cached_answer() {
    let h = Harness::from_toml("");
    let first = h.pipeline.handle(query(TestDomains::example())).await;
    assert_eq!(first.tag, QueryOutcomeTag::Resolved);

    let doc = ManifestFormat::Json
        .parse_document(
            r#"{"identifier":"default","format_version":1,
                "sources":[{"id":"late","block":["example.com"]}]}"#,
        )
        .unwrap();
    h.replace_rules.execute(&doc, Some("default")).unwrap();

    let second = h.pipeline.handle(query(TestDomains::example())).await;
    assert_eq!(second.tag, QueryOutcomeTag::Blocked);
    assert_eq!(h.transport.exchange_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_rewrite_rule_wins_over_cached_answer() {
    let h = Harness::from_toml("");
    let first = h.pipeline.handle(query(TestDomains::example())).await;
    assert_eq!(first.tag, QueryOutcomeTag::Resolved);

    let doc = ManifestFormat::Json
        .parse_document(
            r#"{"identifier":"default","format_version":1,
                "sources":[{"id":"late","rewrite":[
                    {"domain":"example.com","target":"safe.example.net"}]}]}"#,
        )
        .unwrap();
    h.replace_rules.execute(&doc, Some("default")).unwrap();

    let second = h.pipeline.handle(query(TestDomains::example())).await;
    assert_eq!(second.tag, QueryOutcomeTag::Resolved);
    assert_eq!(h.transport.exchange_count(), 2);
    assert_eq!(h.transport.exchanges()[1].domain, "safe.example.net");
}

#[tokio::test(start_paused = true)]
async fn test_whitelist_beats_block_list() {
    let h = Harness::from_toml(
        r#"
[blocking]
blocked_domains = ["example.com"]
whitelisted_domains = ["safe.example.com"]
"#,
    );

    let allowed = h.pipeline.handle(query("safe.example.com")).await;
    let blocked = h.pipeline.handle(query("www.example.com")).await;

    assert_eq!(allowed.tag, QueryOutcomeTag::Resolved);
    assert_eq!(allowed.verdict.source, DecisionSource::Whitelist);
    assert_eq!(blocked.tag, QueryOutcomeTag::Blocked);
}

#[tokio::test(start_paused = true)]
async fn test_identical_rule_replacement_keeps_decisions() {
    let h = Harness::from_toml(BLOCKING);
    let doc = ManifestFormat::Toml
        .parse_document(
            r#"
identifier = "default"
format_version = 1

[[sources]]
id = "ads"
block = ["ads.net", "=exact.example.org"]
allow = ["ok.ads.net"]
rewrite = [{ domain = "old.example.org", target = "new.example.org" }]
"#,
        )
        .unwrap();
    let names = [
        "ads.net",
        "x.ads.net",
        "ok.ads.net",
        "exact.example.org",
        "sub.exact.example.org",
        "old.example.org",
        TestDomains::blocked_tracker(),
        TestDomains::example(),
    ];

    h.replace_rules.execute(&doc, None).unwrap();
    let before: Vec<_> = names.iter().map(|n| h.rules.evaluate(n)).collect();
    h.replace_rules.execute(&doc, None).unwrap();
    let after: Vec<_> = names.iter().map(|n| h.rules.evaluate(n)).collect();

    assert_eq!(before, after);
    assert!(before[0].decision.is_block());
    assert!(!before[2].decision.is_block());
}

// ============================================================================
// Cache policy
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_domain_ttl_override_sets_expiry() {
    // Arrange
    let h = Harness::from_toml(
        r#"
[cache]
default_ttl = 300
domain_rules = [{ domain = "example.com", ttl = 60 }]
"#,
    );
    let q = query(TestDomains::example());

    // Act
    h.pipeline.handle(q.clone()).await;
    h.pipeline.handle(query("other.org")).await;

    // Assert
    let entry = h.cache.lookup(&q).unwrap();
    assert_eq!(entry.ttl_secs, 60);
    assert_eq!(entry.expires_at - entry.inserted_at, Duration::from_secs(60));
    assert_eq!(h.cache.lookup(&query("other.org")).unwrap().ttl_secs, 300);

    tokio::time::advance(Duration::from_secs(59)).await;
    let hit = h.pipeline.handle(q.clone()).await;
    assert_eq!(hit.tag, QueryOutcomeTag::CacheHit);

    tokio::time::advance(Duration::from_secs(2)).await;
    let miss = h.pipeline.handle(q).await;
    assert_eq!(miss.tag, QueryOutcomeTag::Resolved);
    assert_eq!(h.transport.exchange_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cache_bypass_domain_is_never_stored() {
    let h = Harness::from_toml(
        r#"
[cache]
default_ttl = 3600
bypass_domains = ["cdn.example.net"]
"#,
    );

    for _ in 0..3 {
        let outcome = h.pipeline.handle(query("img.cdn.example.net")).await;
        assert_eq!(outcome.tag, QueryOutcomeTag::Resolved);
    }

    assert_eq!(h.transport.exchange_count(), 3);
    assert_eq!(h.cache_control.stats().entries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_user_bypass_drops_existing_entry() {
    let h = Harness::from_toml("");
    let q = query(TestDomains::example());
    h.pipeline.handle(q.clone()).await;
    assert!(h.cache.lookup(&q).is_some());

    h.cache_control.add_bypass("example.com").unwrap();

    assert!(h.cache.lookup(&q).is_none());
    h.pipeline.handle(q.clone()).await;
    assert!(h.cache.lookup(&q).is_none());
}

// ============================================================================
// Bypass grants
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_bypass_grant_allows_until_expiry() {
    // Arrange
    let h = Harness::from_toml(BLOCKING);
    let scope = BypassScope::domain(TestDomains::blocked_ad()).unwrap();

    // Act
    let grant = h
        .bypass
        .request("tester", "letmein", scope, Some(Duration::from_secs(600)))
        .unwrap();

    // Assert
    assert_eq!(h.bypass.remaining(&grant), Duration::from_secs(600));
    let allowed = h.pipeline.handle(query(TestDomains::blocked_ad())).await;
    assert_eq!(allowed.tag, QueryOutcomeTag::Resolved);
    assert_eq!(allowed.verdict.source, DecisionSource::BypassGrant);

    let other = h.pipeline.handle(query(TestDomains::blocked_tracker())).await;
    assert_eq!(other.tag, QueryOutcomeTag::Blocked);

    tokio::time::advance(Duration::from_secs(599)).await;
    let still = h.pipeline.handle(query(TestDomains::blocked_ad())).await;
    assert_ne!(still.tag, QueryOutcomeTag::Blocked);

    tokio::time::advance(Duration::from_secs(2)).await;
    let expired = h.pipeline.handle(query(TestDomains::blocked_ad())).await;
    assert_eq!(expired.tag, QueryOutcomeTag::Blocked);
    assert_eq!(h.bypass.reap_expired(), 1);
    assert!(h.bypass.active_grants().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_revoked_grant_stops_applying_immediately() {
    let h = Harness::from_toml(BLOCKING);
    let grant = h
        .bypass
        .request("tester", "letmein", BypassScope::All, None)
        .unwrap();
    assert_ne!(
        h.pipeline.handle(query(TestDomains::blocked_tracker())).await.tag,
        QueryOutcomeTag::Blocked
    );

    h.bypass.revoke(grant.id).unwrap();

    assert_eq!(
        h.pipeline.handle(query(TestDomains::blocked_tracker())).await.tag,
        QueryOutcomeTag::Blocked
    );
}

#[tokio::test(start_paused = true)]
async fn test_wrong_password_grants_nothing() {
    let h = Harness::from_toml(BLOCKING);

    let result = h
        .bypass
        .request("tester", "guess", BypassScope::All, None);

    assert!(result.is_err());
    assert_eq!(
        h.pipeline.handle(query(TestDomains::blocked_ad())).await.tag,
        QueryOutcomeTag::Blocked
    );
}

#[tokio::test(start_paused = true)]
async fn test_guessing_under_fresh_identities_still_locks_out() {
    // Arrange - default limits: 5 per identity, 20 across all callers
    let h = Harness::from_toml(BLOCKING);
    for i in 0..50 {
        let _ = h.bypass.authenticate(&format!("attacker-{i}"), "wrong");
    }

    // Act
    let during = h.bypass.authenticate("attacker-final", "letmein");

    // Assert
    assert!(during.is_err());
    assert!(h.bypass.is_locked_out("attacker-final"));

    tokio::time::advance(Duration::from_secs(301)).await;
    h.bypass.reap_expired();
    assert_eq!(h.bypass.tracked_identities(), 0);
    assert!(h.bypass.authenticate("attacker-final", "letmein").is_ok());
}
