// src/providers/qiita.rs
// Qiita adapter: fetches one bounded page of the user's items and filters
// by creation month client-side. The API exposes no excerpt, so it stays
// empty; every href navigates off-site.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::BlogConfig;
use crate::error::{BlogError, Result};
use crate::notion::post_mapper::parse_day;
use crate::providers::{BlogProvider, CacheConfig};
use crate::types::{Post, Source};

const API_BASE: &str = "https://qiita.com/api/v2";
const PAGE_SIZE: u32 = 100;
const REVALIDATE: Duration = Duration::from_secs(3600);
const CACHE_TAGS: &[&str] = &["qiita-posts"];
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct QiitaItem {
    title: String,
    url: String,
    created_at: String,
    #[serde(default)]
    tags: Vec<QiitaTag>,
}

#[derive(Debug, Deserialize)]
struct QiitaTag {
    name: String,
}

pub struct QiitaProvider {
    http: reqwest::Client,
    user_id: String,
    access_token: String,
}

impl QiitaProvider {
    /// Only instantiated when both credentials are present.
    pub fn from_config(config: &BlogConfig) -> Option<Self> {
        let user_id = config.qiita_user_id.clone()?;
        let access_token = config.qiita_access_token.clone()?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Some(Self {
            http,
            user_id,
            access_token,
        })
    }
}

fn map_item(item: QiitaItem, date: chrono::NaiveDate) -> Post {
    let source = Source::Qiita;
    Post {
        title: item.title,
        // The API exposes no excerpt.
        excerpt: String::new(),
        date,
        tags: item.tags.into_iter().map(|t| t.name).collect(),
        href: item.url,
        source,
        is_external: source.is_external(),
    }
}

#[async_trait]
impl BlogProvider for QiitaProvider {
    fn source(&self) -> Source {
        Source::Qiita
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig::enabled_for(REVALIDATE, CACHE_TAGS)
    }

    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>> {
        let context = format!("failed to fetch items for Qiita user {}", self.user_id);
        let url = format!(
            "{API_BASE}/users/{}/items?page=1&per_page={PAGE_SIZE}",
            self.user_id
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| BlogError::upstream(context.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlogError::upstream_status(context, status));
        }
        let items: Vec<QiitaItem> = response
            .json()
            .await
            .map_err(|e| BlogError::upstream(context.as_str(), e))?;

        let posts: Vec<Post> = items
            .into_iter()
            .filter_map(|item| parse_day(&item.created_at).map(|date| (item, date)))
            .filter(|(_, date)| {
                use chrono::Datelike;
                date.year() == year && date.month() == month
            })
            .map(|(item, date)| map_item(item, date))
            .collect();

        debug!(year, month, count = posts.len(), "qiita month fetch");
        Ok(posts)
    }
}
