// src/providers/mod.rs
// One adapter per external post source, all behind the same trait. The
// aggregator only ever sees `dyn BlogProvider`; which adapters exist is
// decided once, from configuration.

pub mod notion;
pub mod qiita;
pub mod zenn;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BlogConfig;
use crate::error::Result;
use crate::types::{Post, Source};

/// How the aggregator may memoize a provider's month queries.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Revalidation interval; only meaningful when enabled.
    pub revalidate: Option<Duration>,
    /// Invalidation tags attached to every cached entry.
    pub tags: &'static [&'static str],
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            revalidate: None,
            tags: &[],
        }
    }

    pub fn enabled_for(revalidate: Duration, tags: &'static [&'static str]) -> Self {
        Self {
            enabled: true,
            revalidate: Some(revalidate),
            tags,
        }
    }
}

/// Uniform fetch contract over one post source.
#[async_trait]
pub trait BlogProvider: Send + Sync {
    fn source(&self) -> Source;
    fn cache_config(&self) -> CacheConfig;
    async fn get_posts_by_month(&self, year: i32, month: u32) -> Result<Vec<Post>>;
}

/// Build the active provider set. The Notion source is the site's own
/// content and is always present; the community adapters only activate
/// when their credentials are configured — absence means "inactive", not
/// an error.
pub fn active_providers(
    config: &BlogConfig,
    notion: Arc<notion::NotionProvider>,
) -> Vec<Arc<dyn BlogProvider>> {
    let mut providers: Vec<Arc<dyn BlogProvider>> = vec![notion];

    if let Some(provider) = qiita::QiitaProvider::from_config(config) {
        providers.push(Arc::new(provider));
    }
    if let Some(provider) = zenn::ZennProvider::from_config(config) {
        providers.push(Arc::new(provider));
    }

    providers
}
