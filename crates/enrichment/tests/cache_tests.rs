//! EnrichmentCache behavior against a scripted summary source.

use std::sync::Arc;
use std::time::Duration;

use enrichment::{EnrichmentCache, EnrichmentEntry, LookupOutcome, TitleResolver};
use test_utils::mocks::summary_with_thumbnail;
use test_utils::{MockResponse, MockSummarySource};

const DEBOUNCE: Duration = Duration::from_millis(500);

fn cache_with(source: &Arc<MockSummarySource>) -> EnrichmentCache {
    EnrichmentCache::new(source.clone(), TitleResolver::default(), DEBOUNCE)
}

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ============================================================================
// Memoization
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_back_to_back_same_key_makes_one_call() {
    let source = Arc::new(MockSummarySource::new(Duration::from_millis(100)));
    source.respond("Acer rubrum", MockResponse::Ok(summary_with_thumbnail("Acer rubrum")));
    let cache = cache_with(&source);

    let (a, b) = tokio::join!(cache.lookup("Acer rubrum"), cache.lookup("Acer rubrum"));

    assert_eq!(source.calls(), 1);
    assert_eq!(a, b);
    match a {
        LookupOutcome::Resolved(summary) => {
            assert_eq!(summary.thumbnail_url(), Some("https://upload.example/Acer rubrum.jpg"));
        }
        other => panic!("expected Resolved, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_resolved_key_never_refetches() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let cache = cache_with(&source);

    let first = cache.lookup("Quercus rubra").await;
    assert!(matches!(first, LookupOutcome::Resolved(_)));

    for _ in 0..3 {
        let entry = cache.request("Quercus rubra").await;
        assert!(matches!(entry, EnrichmentEntry::Resolved(_)));
    }
    let again = cache.lookup("Quercus rubra").await;

    assert_eq!(again, first);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_request_waits_for_debounce() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let cache = cache_with(&source);

    assert_eq!(cache.request("Tilia cordata").await, EnrichmentEntry::Pending);
    settle(400).await;
    assert_eq!(source.calls(), 0);
    assert_eq!(cache.entry("Tilia cordata").await, Some(EnrichmentEntry::Pending));

    settle(200).await;
    assert_eq!(source.calls(), 1);
    assert!(matches!(cache.entry("Tilia cordata").await, Some(EnrichmentEntry::Resolved(_))));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_switching_keys_during_debounce_skips_first_fetch() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let cache = cache_with(&source);

    cache.request("Acer rubrum").await;
    settle(100).await;
    cache.request("Prunus serrulata").await;
    settle(600).await;

    assert_eq!(source.titles(), vec!["Prunus serrulata".to_string()]);
    assert_eq!(cache.entry("Acer rubrum").await, None);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_fetch_leaves_no_entry_and_can_retry() {
    let source = Arc::new(MockSummarySource::new(Duration::from_millis(1000)));
    let cache = cache_with(&source);

    let waiting = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.lookup("Acer rubrum").await })
    };

    // fetch for the first key starts at 500ms and would finish at 1500ms
    settle(700).await;
    assert_eq!(source.calls(), 1);
    cache.request("Prunus serrulata").await;

    assert_eq!(waiting.await.unwrap(), LookupOutcome::Cancelled);
    assert_eq!(cache.entry("Acer rubrum").await, None);

    settle(2000).await;
    assert!(matches!(cache.entry("Prunus serrulata").await, Some(EnrichmentEntry::Resolved(_))));

    let retried = cache.lookup("Acer rubrum").await;
    assert!(matches!(retried, LookupOutcome::Resolved(_)));
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_cancel() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let cache = cache_with(&source);

    cache.request("Acer rubrum").await;
    assert!(cache.cancel().await);
    settle(1000).await;

    assert_eq!(source.calls(), 0);
    assert_eq!(cache.entry("Acer rubrum").await, None);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_failure_is_cached_and_distinct_from_pending() {
    let source = Arc::new(MockSummarySource::new(Duration::from_millis(50)));
    source.respond("Ulmus americana", MockResponse::NetworkError);
    let cache = cache_with(&source);

    assert_eq!(cache.request("Ulmus americana").await, EnrichmentEntry::Pending);
    assert_eq!(cache.lookup("Ulmus americana").await, LookupOutcome::Failed);
    assert_eq!(cache.entry("Ulmus americana").await, Some(EnrichmentEntry::Failed));

    assert_eq!(cache.lookup("Ulmus americana").await, LookupOutcome::Failed);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_summary_is_resolved_not_failed() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let cache = cache_with(&source);

    match cache.lookup("Nonexistent plant").await {
        LookupOutcome::Resolved(summary) => assert!(!summary.has_enrichment()),
        other => panic!("expected Resolved, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_name_without_binomial_resolves_empty_without_call() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let cache = cache_with(&source);

    match cache.lookup("'Foo'").await {
        LookupOutcome::Resolved(summary) => assert!(!summary.has_enrichment()),
        other => panic!("expected Resolved, got {:?}", other),
    }
    assert_eq!(source.calls(), 0);
    assert!(matches!(cache.entry("'Foo'").await, Some(EnrichmentEntry::Resolved(_))));
}

// ============================================================================
// Title resolution
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fetch_uses_resolved_title() {
    let source = Arc::new(MockSummarySource::new(Duration::ZERO));
    let overrides = [("Platanus x acerifolia".to_string(), "Platanus × hispanica".to_string())]
        .into_iter()
        .collect();
    let cache = EnrichmentCache::new(source.clone(), TitleResolver::new(overrides), DEBOUNCE);

    cache.lookup("Acer rubrum 'Armstrong'").await;
    cache.lookup("Platanus x acerifolia").await;

    assert_eq!(
        source.titles(),
        vec!["Acer rubrum".to_string(), "Platanus × hispanica".to_string()]
    );
}
