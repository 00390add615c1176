// src/aggregator.rs
// The multi-source aggregation engine: concurrent month fan-out with
// per-provider cache policy, and backward month-walking pagination with a
// minimum-count threshold and a historical-depth cutoff.

use chrono::{Datelike, Months, NaiveDate, Utc};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::cache::TtlCache;
use crate::error::{BlogError, Result};
use crate::providers::BlogProvider;
use crate::types::{FetchResult, Post, TagWithCount};

/// A page of the feed keeps growing until at least this many posts are in it
/// (or the walk hits the historical cutoff).
pub const MIN_POSTS_THRESHOLD: usize = 15;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "blog_provider_errors_total",
            "Provider fetches excluded from a month merge."
        );
        describe_counter!("blog_month_cache_hits_total", "Month-query cache hits.");
        describe_counter!("blog_month_cache_misses_total", "Month-query cache misses.");
        describe_counter!(
            "blog_bookmark_fallbacks_total",
            "Bookmark previews degraded to plain links."
        );
        describe_histogram!("blog_convert_ms", "Block-to-HTML conversion time in milliseconds.");
    });
}

pub struct Aggregator {
    providers: Vec<Arc<dyn BlogProvider>>,
    month_cache: TtlCache<Vec<Post>>,
    history_years: u32,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn BlogProvider>>, history_years: u32) -> Self {
        Self {
            providers,
            month_cache: TtlCache::new(Duration::from_secs(3600)),
            history_years,
        }
    }

    /// Fetch one calendar month from every active provider concurrently and
    /// merge the results. This is a join point, not a race: every fetch
    /// settles before we proceed, and a failing provider is logged and
    /// excluded — it never aborts its siblings.
    pub async fn posts_by_month(&self, year: i32, month: u32) -> Vec<Post> {
        ensure_metrics_described();

        let fetches = self.providers.iter().map(|provider| async move {
            (provider.source(), self.fetch_month(provider.as_ref(), year, month).await)
        });
        let settled = join_all(fetches).await;

        let mut posts = Vec::new();
        for (source, outcome) in settled {
            match outcome {
                Ok(batch) => posts.extend(batch),
                Err(error) => {
                    warn!(provider = %source, %error, "provider failed; excluded from month merge");
                    counter!("blog_provider_errors_total").increment(1);
                }
            }
        }
        sort_posts(&mut posts);
        posts
    }

    /// Apply the provider's own cache policy around its fetch.
    async fn fetch_month(
        &self,
        provider: &dyn BlogProvider,
        year: i32,
        month: u32,
    ) -> Result<Vec<Post>> {
        let config = provider.cache_config();
        if !config.enabled {
            return provider.get_posts_by_month(year, month).await;
        }

        let key = format!("{}-posts-{year}-{month:02}", provider.source());
        if let Some(hit) = self.month_cache.get(&key) {
            counter!("blog_month_cache_hits_total").increment(1);
            return Ok(hit);
        }
        counter!("blog_month_cache_misses_total").increment(1);

        let posts = provider.get_posts_by_month(year, month).await?;
        let ttl = config.revalidate.unwrap_or(Duration::from_secs(3600));
        self.month_cache.insert_with(key, posts.clone(), ttl, config.tags);
        Ok(posts)
    }

    /// Walk backward from the given month, accumulating posts until the
    /// threshold is met or the historical cutoff is crossed. The returned
    /// `last_year_month` is the continuation cursor for the next page.
    pub async fn fetch_posts_from_month(&self, start_year: i32, start_month: u32) -> FetchResult {
        let mut posts: Vec<Post> = Vec::new();
        let (mut year, mut month) = (start_year, start_month);
        let mut last_year_month = format_year_month(year, month);
        let limit = self.history_limit();

        while posts.len() < MIN_POSTS_THRESHOLD {
            let current = first_of_month(year, month);
            if current < limit {
                return FetchResult {
                    posts,
                    last_year_month,
                    has_more: false,
                };
            }

            let month_posts = self.posts_by_month(year, month).await;
            posts.extend(month_posts);
            last_year_month = format_year_month(year, month);

            (year, month) = step_back(year, month);
        }

        FetchResult {
            posts,
            last_year_month,
            has_more: true,
        }
    }

    /// The unconditional walk: every month from now back to the cutoff.
    /// Used for tag aggregation and "all posts" views; can be expensive.
    pub async fn get_all_posts(&self) -> Vec<Post> {
        let today = Utc::now().date_naive();
        let (mut year, mut month) = (today.year(), today.month());
        let limit = self.history_limit();
        let mut posts: Vec<Post> = Vec::new();

        loop {
            if first_of_month(year, month) < limit {
                break;
            }
            posts.extend(self.posts_by_month(year, month).await);
            (year, month) = step_back(year, month);
        }

        sort_posts(&mut posts);
        posts
    }

    /// Tag → post count over the full history window, most-used first.
    pub async fn get_blog_tags(&self) -> Vec<TagWithCount> {
        let posts = self.get_all_posts().await;

        let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        for post in &posts {
            for tag in &post.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<TagWithCount> = counts
            .into_iter()
            .map(|(name, count)| TagWithCount { name, count })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        tags
    }

    /// Drop cached month entries carrying `tag`.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        self.month_cache.invalidate_tag(tag)
    }

    /// Oldest date the walk may consult: today minus the configured years.
    fn history_limit(&self) -> NaiveDate {
        let today = Utc::now().date_naive();
        today
            .checked_sub_months(Months::new(12 * self.history_years))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Newest first. The secondary keys make same-date ordering deterministic:
/// source, then title, both ascending.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.source.as_str().cmp(b.source.as_str()))
            .then_with(|| a.title.cmp(&b.title))
    });
}

static CURSOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

/// Parse a "YYYY-MM" cursor and return the calendar month immediately before
/// it, wrapping the year boundary. Malformed input is a typed error and
/// triggers no fetch.
pub fn previous_month(year_month: &str) -> Result<(i32, u32)> {
    if !CURSOR_RE.is_match(year_month) {
        return Err(BlogError::InvalidCursor(year_month.to_string()));
    }
    let (year_str, month_str) = year_month
        .split_once('-')
        .expect("regex guarantees one separator");
    let year: i32 = year_str
        .parse()
        .map_err(|_| BlogError::InvalidCursor(year_month.to_string()))?;
    let month: u32 = month_str
        .parse()
        .map_err(|_| BlogError::InvalidCursor(year_month.to_string()))?;

    if !(1..=12).contains(&month) {
        return Err(BlogError::MonthOutOfRange(month));
    }

    Ok(if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    })
}

fn step_back(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn format_year_month(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("month stays in 1..=12")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_month_wraps_the_year_boundary() {
        assert_eq!(previous_month("2024-01").unwrap(), (2023, 12));
        assert_eq!(previous_month("2024-07").unwrap(), (2024, 6));
        assert_eq!(previous_month("2024-12").unwrap(), (2024, 11));
    }

    #[test]
    fn previous_month_rejects_malformed_cursors() {
        for bad in ["2024/01", "202401", "2024-1", "24-01", "abcd-ef", "2024-01-15", ""] {
            assert!(
                matches!(previous_month(bad), Err(BlogError::InvalidCursor(_))),
                "cursor {bad:?} should be rejected as malformed"
            );
        }
    }

    #[test]
    fn previous_month_rejects_out_of_range_months() {
        assert!(matches!(previous_month("2024-00"), Err(BlogError::MonthOutOfRange(0))));
        assert!(matches!(previous_month("2024-13"), Err(BlogError::MonthOutOfRange(13))));
    }

    #[test]
    fn sort_is_deterministic_on_equal_dates() {
        use crate::types::Source;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let post = |title: &str, source: Source| Post {
            title: title.to_string(),
            excerpt: String::new(),
            date,
            tags: vec![],
            href: String::new(),
            source,
            is_external: source.is_external(),
        };

        let mut posts = vec![
            post("b", Source::Zenn),
            post("a", Source::Zenn),
            post("z", Source::Notion),
        ];
        sort_posts(&mut posts);
        let order: Vec<(&str, Source)> = posts.iter().map(|p| (p.title.as_str(), p.source)).collect();
        assert_eq!(
            order,
            vec![("z", Source::Notion), ("a", Source::Zenn), ("b", Source::Zenn)]
        );
    }
}
