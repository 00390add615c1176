// src/notion/link_preview.rs
// Resolves a URL to the metadata a bookmark card needs: document title,
// description, hero image, favicon. Scraping is best-effort — the page's
// <title> and Open Graph meta tags are pulled out with cached regexes and
// anything missing stays None. Callers treat any error as "render a plain
// link instead".

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::error::{BlogError, Result};

#[derive(Debug, Clone, Default)]
pub struct LinkPreview {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
}

#[async_trait]
pub trait FetchPreview: Send + Sync {
    async fn fetch_preview(&self, url: &str) -> Result<LinkPreview>;
}

const PREVIEW_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpPreviewFetcher {
    http: reqwest::Client,
}

impl HttpPreviewFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(PREVIEW_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }
}

impl Default for HttpPreviewFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchPreview for HttpPreviewFetcher {
    async fn fetch_preview(&self, url: &str) -> Result<LinkPreview> {
        let context = format!("failed to fetch link preview for {url}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BlogError::upstream(context.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlogError::upstream_status(context, status));
        }
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| BlogError::upstream(context.as_str(), e))?;

        Ok(parse_preview(&final_url, &body))
    }
}

static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static RE_OG_TITLE: Lazy<Regex> = Lazy::new(|| meta_regex("og:title"));
static RE_OG_DESCRIPTION: Lazy<Regex> = Lazy::new(|| meta_regex("og:description"));
static RE_OG_IMAGE: Lazy<Regex> = Lazy::new(|| meta_regex("og:image"));
static RE_FAVICON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link[^>]*rel=["'](?:shortcut\s+)?icon["'][^>]*href=["']([^"']+)["']"#)
        .unwrap()
});

fn meta_regex(property: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)<meta[^>]*property=["']{property}["'][^>]*content=["']([^"']*)["']"#
    ))
    .unwrap()
}

fn parse_preview(url: &str, body: &str) -> LinkPreview {
    let title = capture(&RE_OG_TITLE, body).or_else(|| capture(&RE_TITLE, body));
    let description = capture(&RE_OG_DESCRIPTION, body);
    let image = capture(&RE_OG_IMAGE, body).map(|href| absolutize(url, &href));
    let favicon = capture(&RE_FAVICON, body).map(|href| absolutize(url, &href));

    LinkPreview {
        url: Some(url.to_string()),
        title,
        description,
        image,
        favicon,
    }
}

fn capture(re: &Regex, body: &str) -> Option<String> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str().trim()).into_owned())
        .filter(|text| !text.is_empty())
}

/// Resolve a possibly-relative href against the page URL.
fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match reqwest::Url::parse(base).and_then(|b| b.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
