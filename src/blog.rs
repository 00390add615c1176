// src/blog.rs
// The inbound surface the UI pulls from. One explicitly constructed
// object owns the client, the provider set, and the aggregator — no
// hidden process-wide state; tests inject their own providers.

use chrono::{Datelike, Utc};
use std::sync::Arc;

use crate::aggregator::{previous_month, Aggregator};
use crate::config::BlogConfig;
use crate::error::Result;
use crate::notion::client::NotionClient;
use crate::providers::notion::NotionProvider;
use crate::providers::{active_providers, BlogProvider};
use crate::types::{FetchResult, Post, PostDetail, TagWithCount};

pub struct Blog {
    aggregator: Aggregator,
    notion: Arc<NotionProvider>,
}

impl Blog {
    pub fn from_env() -> Self {
        Self::new(BlogConfig::from_env())
    }

    pub fn new(config: BlogConfig) -> Self {
        let client = Arc::new(NotionClient::new(&config));
        let notion = Arc::new(NotionProvider::new(client));
        let providers = active_providers(&config, Arc::clone(&notion));
        Self::with_providers(providers, notion, config.history_years)
    }

    /// Dependency-injecting constructor; the entry point for tests.
    pub fn with_providers(
        providers: Vec<Arc<dyn BlogProvider>>,
        notion: Arc<NotionProvider>,
        history_years: u32,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(providers, history_years),
            notion,
        }
    }

    /// First page of the feed, starting at the current month.
    pub async fn initial_posts(&self) -> FetchResult {
        let today = Utc::now().date_naive();
        self.aggregator
            .fetch_posts_from_month(today.year(), today.month())
            .await
    }

    /// Next page: resume from the month immediately before the cursor.
    pub async fn more_posts(&self, cursor: &str) -> Result<FetchResult> {
        let (year, month) = previous_month(cursor)?;
        Ok(self.aggregator.fetch_posts_from_month(year, month).await)
    }

    /// Every post within the history window, across all sources.
    pub async fn all_posts(&self) -> Vec<Post> {
        self.aggregator.get_all_posts().await
    }

    /// All tags with their post counts, most-used first.
    pub async fn tags(&self) -> Vec<TagWithCount> {
        self.aggregator.get_blog_tags().await
    }

    /// Detail lookup; only the structured source can render one.
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>> {
        self.notion.get_post_by_slug(slug).await
    }

    /// Drop cached month queries carrying `tag` (e.g. "qiita-posts").
    pub fn invalidate(&self, tag: &str) -> usize {
        self.aggregator.invalidate_tag(tag)
    }
}
