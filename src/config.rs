// src/config.rs
// Environment-driven configuration. `.env` is loaded by the binary
// (dotenvy) before this runs; the library itself only reads the process
// environment once, in `from_env`. Tests construct the struct directly.

use crate::error::{BlogError, Result};

pub const DEFAULT_HISTORY_YEARS: u32 = 5;

/// Everything the data layer takes from the environment.
///
/// Notion credentials are required for the site's own posts but validated
/// lazily — on the first real backend call, not at startup. The community
/// source credentials only gate whether that adapter is active at all.
#[derive(Debug, Clone, Default)]
pub struct BlogConfig {
    pub notion_token: Option<String>,
    pub notion_datasource_id: Option<String>,
    pub qiita_user_id: Option<String>,
    pub qiita_access_token: Option<String>,
    pub zenn_username: Option<String>,
    /// How many years back the aggregator will ever walk.
    pub history_years: u32,
}

impl BlogConfig {
    pub fn from_env() -> Self {
        Self {
            notion_token: env_opt("NOTION_TOKEN"),
            notion_datasource_id: env_opt("NOTION_DATASOURCE_ID"),
            qiita_user_id: env_opt("QIITA_USER_ID"),
            qiita_access_token: env_opt("QIITA_ACCESS_TOKEN"),
            zenn_username: env_opt("ZENN_USERNAME"),
            history_years: history_years_from_env(),
        }
    }
}

/// Read an env var, treating unset and blank the same way.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// `BLOG_HISTORY_YEARS` override; anything unset, non-numeric, or
/// non-positive falls back to the default.
fn history_years_from_env() -> u32 {
    std::env::var("BLOG_HISTORY_YEARS")
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|years| *years > 0)
        .unwrap_or(DEFAULT_HISTORY_YEARS)
}

/// Fail fast with the variable's name when a required value is absent or blank.
pub fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(value.as_deref().unwrap()),
        _ => Err(BlogError::MissingConfig { name }),
    }
}
