// tests/aggregator_pagination.rs
//
// Backward month-walking pagination against stub providers.
//
// Covered:
// - threshold: the walk keeps going until at least MIN_POSTS_THRESHOLD posts
// - cutoff: hasMore=false exactly when the historical limit stops the walk
// - partial failure: a broken provider is excluded, never propagated
// - per-provider cache policy: enabled configs memoize month queries

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blog_aggregator::aggregator::{previous_month, Aggregator, MIN_POSTS_THRESHOLD};
use blog_aggregator::error::{BlogError, Result};
use blog_aggregator::providers::{BlogProvider, CacheConfig};
use blog_aggregator::types::{Post, Source};

fn post(source: Source, date: NaiveDate, title: &str, tags: &[&str]) -> Post {
    Post {
        title: title.to_string(),
        excerpt: String::new(),
        date,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        href: format!("https://example.com/{title}"),
        source,
        is_external: source.is_external(),
    }
}

/// Yields a fixed number of posts for every month it is asked about.
struct SteadyProvider {
    source: Source,
    per_month: usize,
}

#[async_trait]
impl BlogProvider for SteadyProvider {
    fn source(&self) -> Source {
        self.source
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::disabled()
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        Ok((0..self.per_month)
            .map(|i| post(self.source, date, &format!("{}-{year}-{month:02}-{i}", self.source), &[]))
            .collect())
    }
}

/// Yields posts only for specific months.
struct SparseProvider {
    source: Source,
    months: HashMap<(i32, u32), Vec<Post>>,
}

#[async_trait]
impl BlogProvider for SparseProvider {
    fn source(&self) -> Source {
        self.source
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::disabled()
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        Ok(self.months.get(&(year, month)).cloned().unwrap_or_default())
    }
}

/// Always errors, like an upstream outage.
struct BrokenProvider;

#[async_trait]
impl BlogProvider for BrokenProvider {
    fn source(&self) -> Source {
        Source::Qiita
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::disabled()
    }

    async fn get_posts_by_month(&self, _year: i32, _month: u32) -> Result<Vec<Post>> {
        Err(BlogError::upstream_status(
            "stub provider outage",
            reqwest::StatusCode::BAD_GATEWAY,
        ))
    }
}

/// Counts how often it is actually consulted; cache enabled.
struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl BlogProvider for CountingProvider {
    fn source(&self) -> Source {
        Source::Zenn
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::enabled_for(Duration::from_secs(3600), &["zenn-posts"])
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        Ok(vec![post(Source::Zenn, date, "counted", &[])])
    }
}

fn months_back(n: u32) -> (i32, u32) {
    let today = Utc::now().date_naive();
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..n {
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    (year, month)
}

#[tokio::test]
async fn walk_stops_once_threshold_is_met() {
    let aggregator = Aggregator::new(
        vec![Arc::new(SteadyProvider {
            source: Source::Qiita,
            per_month: 4,
        })],
        5,
    );

    let today = Utc::now().date_naive();
    let result = aggregator
        .fetch_posts_from_month(today.year(), today.month())
        .await;

    // 4 posts per month: the first total >= 15 is 16, after 4 months.
    assert_eq!(result.posts.len(), 16, "walk should stop at the first month crossing the threshold");
    assert!(result.has_more, "threshold stop means more history remains");

    let (y, m) = months_back(3);
    assert_eq!(result.last_year_month, format!("{y}-{m:02}"));
    assert!(
        result.posts.len() >= MIN_POSTS_THRESHOLD,
        "never return fewer than the threshold while more posts exist"
    );
}

#[tokio::test]
async fn walk_reports_no_more_at_the_historical_cutoff() {
    let aggregator = Aggregator::new(
        vec![Arc::new(SparseProvider {
            source: Source::Qiita,
            months: HashMap::new(),
        })],
        1,
    );

    let today = Utc::now().date_naive();
    let result = aggregator
        .fetch_posts_from_month(today.year(), today.month())
        .await;

    assert!(result.posts.is_empty());
    assert!(!result.has_more, "hitting the cutoff must clear hasMore");
    // The cursor is still a well-formed month we actually consulted.
    assert!(previous_month(&result.last_year_month).is_ok());
}

#[tokio::test]
async fn sparse_history_returns_everything_available() {
    let today = Utc::now().date_naive();
    let (y, m) = (today.year(), today.month());
    let date = NaiveDate::from_ymd_opt(y, m, 1).unwrap();

    let months = HashMap::from([(
        (y, m),
        (0..5)
            .map(|i| post(Source::Qiita, date, &format!("only-{i}"), &[]))
            .collect::<Vec<_>>(),
    )]);
    let aggregator = Aggregator::new(
        vec![Arc::new(SparseProvider {
            source: Source::Qiita,
            months,
        })],
        1,
    );

    let result = aggregator.fetch_posts_from_month(y, m).await;
    assert_eq!(result.posts.len(), 5, "all available posts are returned even below the threshold");
    assert!(!result.has_more);
}

#[tokio::test]
async fn failing_provider_is_excluded_not_fatal() {
    let today = Utc::now().date_naive();
    let aggregator = Aggregator::new(
        vec![
            Arc::new(SteadyProvider {
                source: Source::Zenn,
                per_month: 2,
            }),
            Arc::new(BrokenProvider),
        ],
        5,
    );

    let posts = aggregator.posts_by_month(today.year(), today.month()).await;
    assert_eq!(posts.len(), 2, "only the healthy provider's posts survive the merge");
    assert!(posts.iter().all(|p| p.source == Source::Zenn));
}

#[tokio::test]
async fn merged_month_is_sorted_newest_first() {
    let today = Utc::now().date_naive();
    let (y, m) = (today.year(), today.month());
    let early = NaiveDate::from_ymd_opt(y, m, 2).unwrap();
    let late = NaiveDate::from_ymd_opt(y, m, 20).unwrap();

    let months_a = HashMap::from([((y, m), vec![post(Source::Qiita, early, "early", &[])])]);
    let months_b = HashMap::from([((y, m), vec![post(Source::Zenn, late, "late", &[])])]);

    let aggregator = Aggregator::new(
        vec![
            Arc::new(SparseProvider {
                source: Source::Qiita,
                months: months_a,
            }),
            Arc::new(SparseProvider {
                source: Source::Zenn,
                months: months_b,
            }),
        ],
        5,
    );

    let posts = aggregator.posts_by_month(y, m).await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["late", "early"]);
}

#[tokio::test]
async fn enabled_cache_config_memoizes_month_queries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let aggregator = Aggregator::new(
        vec![Arc::new(CountingProvider {
            calls: Arc::clone(&calls),
        })],
        5,
    );

    let today = Utc::now().date_naive();
    let (y, m) = (today.year(), today.month());

    aggregator.posts_by_month(y, m).await;
    aggregator.posts_by_month(y, m).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second query must be served from cache");

    // Tag invalidation forces the next query back to the provider.
    assert_eq!(aggregator.invalidate_tag("zenn-posts"), 1);
    aggregator.posts_by_month(y, m).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
