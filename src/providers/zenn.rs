// src/providers/zenn.rs
// Zenn adapter. Structurally analogous to the Qiita one but kept
// independent — the two APIs share nothing beyond "JSON over HTTPS" and
// diverge in auth, pagination, and item shape. The articles listing
// carries no tag information, so tags stay empty.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::BlogConfig;
use crate::error::{BlogError, Result};
use crate::notion::post_mapper::parse_day;
use crate::providers::{BlogProvider, CacheConfig};
use crate::types::{Post, Source};

const API_BASE: &str = "https://zenn.dev/api";
const REVALIDATE: Duration = Duration::from_secs(3600);
const CACHE_TAGS: &[&str] = &["zenn-posts"];
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ZennArticle {
    title: String,
    #[serde(default)]
    published_at: Option<String>,
    path: String,
}

#[derive(Debug, Deserialize)]
struct ZennResponse {
    articles: Vec<ZennArticle>,
}

pub struct ZennProvider {
    http: reqwest::Client,
    username: String,
}

impl ZennProvider {
    /// Only instantiated when the username is configured.
    pub fn from_config(config: &BlogConfig) -> Option<Self> {
        let username = config.zenn_username.clone()?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Some(Self { http, username })
    }
}

fn map_article(article: ZennArticle, date: chrono::NaiveDate) -> Post {
    let source = Source::Zenn;
    Post {
        title: article.title,
        excerpt: String::new(),
        date,
        // The listing API exposes no tags.
        tags: Vec::new(),
        href: format!("https://zenn.dev{}", article.path),
        source,
        is_external: source.is_external(),
    }
}

#[async_trait]
impl BlogProvider for ZennProvider {
    fn source(&self) -> Source {
        Source::Zenn
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::enabled_for(REVALIDATE, CACHE_TAGS)
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        let context = format!("failed to fetch articles for Zenn user {}", self.username);
        let url = format!("{API_BASE}/articles?username={}", self.username);
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BlogError::upstream(context.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlogError::upstream_status(context, status));
        }
        let data: ZennResponse = response
            .json()
            .await
            .map_err(|e| BlogError::upstream(context.as_str(), e))?;

        let posts: Vec<Post> = data
            .articles
            .into_iter()
            .filter_map(|article| {
                article
                    .published_at
                    .as_deref()
                    .and_then(parse_day)
                    .map(|date| (article, date))
            })
            .filter(|(_, date)| {
                use chrono::Datelike;
                date.year() == year && date.month() == month
            })
            .map(|(article, date)| map_article(article, date))
            .collect();

        debug!(year, month, count = posts.len(), "zenn month fetch");
        Ok(posts)
    }
}
