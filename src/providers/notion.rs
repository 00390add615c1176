// src/providers/notion.rs
// The site's own content source. Month queries filter client-side over the
// full published collection, so the collection fetch is memoized for a
// short TTL to bound call volume; the aggregator-level cache stays
// disabled because edits must show up near-real-time.
//
// This is the only provider that can render a post detail: it owns the
// slug lookup and the block-to-HTML conversion pipeline.

use async_trait::async_trait;
use chrono::Datelike;
use metrics::histogram;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::{BlogError, Result};
use crate::notion::block_converter::BlockConverter;
use crate::notion::client::NotionClient;
use crate::notion::link_preview::{FetchPreview, HttpPreviewFetcher};
use crate::notion::post_mapper::{map_page_to_detail, map_page_to_post};
use crate::notion::types::Page;
use crate::providers::{BlogProvider, CacheConfig};
use crate::types::{Post, PostDetail, Source};

const ALL_POSTS_TTL: Duration = Duration::from_secs(60);
const ALL_POSTS_KEY: &str = "all-posts";

pub struct NotionProvider {
    client: Arc<NotionClient>,
    previews: Arc<dyn FetchPreview>,
    posts_cache: TtlCache<Vec<Post>>,
}

impl NotionProvider {
    pub fn new(client: Arc<NotionClient>) -> Self {
        Self::with_previews(client, Arc::new(HttpPreviewFetcher::new()))
    }

    pub fn with_previews(client: Arc<NotionClient>, previews: Arc<dyn FetchPreview>) -> Self {
        Self {
            client,
            previews,
            posts_cache: TtlCache::new(ALL_POSTS_TTL),
        }
    }

    /// The full published collection, newest first, memoized for 60 s.
    async fn all_posts(&self) -> Result<Vec<Post>> {
        if let Some(hit) = self.posts_cache.get(ALL_POSTS_KEY) {
            debug!("notion all-posts cache hit");
            return Ok(hit);
        }

        let pages = self.client.query_datasource(published_filter()).await?;
        let mut posts: Vec<Post> = pages.iter().map(map_page_to_post).collect();
        crate::aggregator::sort_posts(&mut posts);
        self.posts_cache.insert(ALL_POSTS_KEY, posts.clone());
        Ok(posts)
    }

    /// Look up one published post by slug and render its document to HTML.
    /// Zero matches is a normal outcome; two or more is a data-integrity
    /// violation that must not be silently resolved by picking one.
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>> {
        let pages = self.client.query_datasource(slug_filter(slug)).await?;
        let Some(page) = single_match(pages, slug)? else {
            return Ok(None);
        };

        let blocks = self.client.list_block_children(&page.id).await?;

        let started = Instant::now();
        let mut converter = BlockConverter::new(self.client.as_ref(), self.previews.as_ref());
        let content = converter.convert_all(&blocks).await?;
        histogram!("blog_convert_ms").record(started.elapsed().as_secs_f64() * 1_000.0);

        Ok(Some(map_page_to_detail(&page, content)))
    }
}

/// The data model guarantees slug uniqueness; a violation is fatal, not
/// something to resolve by picking a match.
fn single_match(mut pages: Vec<Page>, slug: &str) -> Result<Option<Page>> {
    match pages.len() {
        0 => Ok(None),
        1 => Ok(Some(pages.remove(0))),
        count => Err(BlogError::DuplicateSlug {
            slug: slug.to_string(),
            count,
        }),
    }
}

fn published_filter() -> serde_json::Value {
    json!({
        "property": "Published",
        "checkbox": { "equals": true }
    })
}

fn slug_filter(slug: &str) -> serde_json::Value {
    json!({
        "and": [
            {
                "property": "Slug",
                "rich_text": { "equals": slug }
            },
            {
                "property": "Published",
                "checkbox": { "equals": true }
            }
        ]
    })
}

#[async_trait]
impl BlogProvider for NotionProvider {
    fn source(&self) -> Source {
        Source::Notion
    }

    fn cache_config(&self) -> CacheConfig {
        // Near-real-time visibility of edits; the 60 s memo above is the
        // only buffering this source gets.
        CacheConfig::disabled()
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        let posts = self.all_posts().await?;
        Ok(posts
            .into_iter()
            .filter(|post| post.date.year() == year && post.date.month() == month)
            .collect())
    }
}
