// src/error.rs
// Error taxonomy for the whole data layer. Configuration problems are fatal
// on first use, upstream failures always carry operation context, duplicate
// slugs are an integrity violation and never silently resolved, and
// "no matching record" is Ok(None) rather than an error.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("{name} is required but not defined in environment variables")]
    MissingConfig { name: &'static str },

    #[error("invalid cursor format, expected YYYY-MM: {0}")]
    InvalidCursor(String),

    #[error("invalid month value, expected 1-12: {0}")]
    MonthOutOfRange(u32),

    #[error("multiple posts found with slug \"{slug}\": expected exactly 1, found {count}")]
    DuplicateSlug { slug: String, count: usize },

    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: unexpected HTTP status {status}")]
    UpstreamStatus { context: String, status: StatusCode },
}

impl BlogError {
    /// Wrap a transport error with "what were we fetching" context.
    pub fn upstream(context: impl Into<String>, source: reqwest::Error) -> Self {
        BlogError::Upstream {
            context: context.into(),
            source,
        }
    }

    pub fn upstream_status(context: impl Into<String>, status: StatusCode) -> Self {
        BlogError::UpstreamStatus {
            context: context.into(),
            status,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
