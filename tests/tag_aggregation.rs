// tests/tag_aggregation.rs
//
// Tag counting over the full history window: one count per post carrying
// the tag, sorted by count descending with a deterministic tie-break.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;

use blog_aggregator::aggregator::Aggregator;
use blog_aggregator::error::Result;
use blog_aggregator::providers::{BlogProvider, CacheConfig};
use blog_aggregator::types::{Post, Source};

/// Returns a fixed batch of posts for the current month and nothing else.
struct CurrentMonthProvider {
    posts: Vec<Post>,
}

#[async_trait]
impl BlogProvider for CurrentMonthProvider {
    fn source(&self) -> Source {
        Source::Qiita
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::disabled()
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        let today = Utc::now().date_naive();
        if year == today.year() && month == today.month() {
            Ok(self.posts.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

fn post_with_tags(title: &str, tags: &[&str]) -> Post {
    let today = Utc::now().date_naive();
    let source = Source::Qiita;
    Post {
        title: title.to_string(),
        excerpt: String::new(),
        date: NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        href: format!("https://example.com/{title}"),
        source,
        is_external: source.is_external(),
    }
}

#[tokio::test]
async fn tags_are_counted_once_per_post_and_sorted() {
    let provider = CurrentMonthProvider {
        posts: vec![
            post_with_tags("p1", &["a", "b"]),
            post_with_tags("p2", &["a"]),
            post_with_tags("p3", &["c"]),
        ],
    };
    let aggregator = Aggregator::new(vec![Arc::new(provider)], 1);

    let tags = aggregator.get_blog_tags().await;
    let pairs: Vec<(&str, usize)> = tags.iter().map(|t| (t.name.as_str(), t.count)).collect();

    assert_eq!(
        pairs,
        vec![("a", 2), ("b", 1), ("c", 1)],
        "count descending, name ascending on ties"
    );
}

#[tokio::test]
async fn no_posts_means_no_tags() {
    let aggregator = Aggregator::new(
        vec![Arc::new(CurrentMonthProvider { posts: vec![] })],
        1,
    );
    assert!(aggregator.get_blog_tags().await.is_empty());
}
