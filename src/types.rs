// src/types.rs
// Canonical cross-source post model shared by every provider, plus the
// pagination contract returned to incremental-loading callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which upstream a post came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Notion,
    Qiita,
    Zenn,
}

impl Source {
    /// Only Notion posts live on our own site; everything else navigates away.
    pub fn is_external(self) -> bool {
        !matches!(self, Source::Notion)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Notion => "notion",
            Source::Qiita => "qiita",
            Source::Zenn => "zenn",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One post in the unified feed, regardless of where it was published.
/// Serialized camelCase — this is the wire contract the UI consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,
    /// May be empty; the community APIs expose no excerpt.
    pub excerpt: String,
    /// Day precision by construction; time-of-day is always truncated.
    pub date: NaiveDate,
    pub tags: Vec<String>,
    /// Internal path (`/posts/{slug}`) or absolute external URL.
    pub href: String,
    pub source: Source,
    pub is_external: bool,
}

/// Full detail for a Notion-backed post (the only source we render ourselves).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    /// Self-contained, sanitized HTML fragment.
    pub content: String,
    pub tags: Vec<String>,
    pub created_time: NaiveDate,
    pub last_edited_time: NaiveDate,
}

/// Tag name with the number of posts carrying it across the full history window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWithCount {
    pub name: String,
    pub count: usize,
}

/// Result of one backward-walking fetch. `last_year_month` doubles as the
/// continuation cursor for the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub posts: Vec<Post>,
    /// Oldest calendar month actually consulted, "YYYY-MM".
    pub last_year_month: String,
    /// False only when the walk hit the historical cutoff.
    pub has_more: bool,
}

/// One entry of a derived table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    pub id: String,
    pub title: String,
    pub level: u8,
}
