// src/notion/client.rs
// Thin authenticated client over the structured-content REST backend.
// One reqwest client per instance, reused for the process lifetime.
// Credentials are validated lazily on the first real call so that a
// misconfigured deployment fails with a descriptive error at first use
// rather than at startup.

use once_cell::sync::OnceCell;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::{require, BlogConfig};
use crate::error::{BlogError, Result};
use crate::notion::types::{Block, BlockChildrenResponse, Page, QueryResponse};

const API_BASE: &str = "https://api.notion.com/v1";
const API_VERSION: &str = "2025-09-03";
const BLOCK_PAGE_SIZE: u32 = 100;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

struct Credentials {
    token: String,
    datasource_id: String,
}

pub struct NotionClient {
    http: reqwest::Client,
    token: Option<String>,
    datasource_id: Option<String>,
    credentials: OnceCell<Credentials>,
}

impl NotionClient {
    pub fn new(config: &BlogConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            token: config.notion_token.clone(),
            datasource_id: config.notion_datasource_id.clone(),
            credentials: OnceCell::new(),
        }
    }

    fn credentials(&self) -> Result<&Credentials> {
        self.credentials.get_or_try_init(|| {
            let token = require(&self.token, "NOTION_TOKEN")?.to_string();
            let datasource_id = require(&self.datasource_id, "NOTION_DATASOURCE_ID")?.to_string();
            Ok(Credentials {
                token,
                datasource_id,
            })
        })
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header("Notion-Version", API_VERSION)
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder, context: &str) -> Result<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| BlogError::upstream(context, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlogError::upstream_status(context, status));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BlogError::upstream(context, e))
    }

    /// Backend-wide search; returns the raw response.
    pub async fn search(&self) -> Result<Value> {
        let creds = self.credentials()?;
        let builder = self
            .authed(self.http.post(format!("{API_BASE}/search")), &creds.token)
            .json(&json!({}));
        self.execute(builder, "failed to search the content backend")
            .await
    }

    pub async fn retrieve_datasource(&self) -> Result<Value> {
        let creds = self.credentials()?;
        let context = format!("failed to retrieve datasource {}", creds.datasource_id);
        let builder = self.authed(
            self.http
                .get(format!("{API_BASE}/data_sources/{}", creds.datasource_id)),
            &creds.token,
        );
        self.execute(builder, &context).await
    }

    pub async fn retrieve_page(&self, page_id: &str) -> Result<Page> {
        let creds = self.credentials()?;
        let context = format!("failed to retrieve page {page_id}");
        let builder = self.authed(
            self.http.get(format!("{API_BASE}/pages/{page_id}")),
            &creds.token,
        );
        self.execute(builder, &context).await
    }

    pub async fn retrieve_page_property(&self, page_id: &str, property_id: &str) -> Result<Value> {
        let creds = self.credentials()?;
        let context = format!("failed to retrieve property {property_id} from page {page_id}");
        let builder = self.authed(
            self.http
                .get(format!("{API_BASE}/pages/{page_id}/properties/{property_id}")),
            &creds.token,
        );
        self.execute(builder, &context).await
    }

    /// Query the configured datasource with a backend filter expression.
    pub async fn query_datasource(&self, filter: Value) -> Result<Vec<Page>> {
        let creds = self.credentials()?;
        let context = format!("failed to query datasource {}", creds.datasource_id);
        let builder = self
            .authed(
                self.http.post(format!(
                    "{API_BASE}/data_sources/{}/query",
                    creds.datasource_id
                )),
                &creds.token,
            )
            .json(&json!({ "filter": filter }));
        let response: QueryResponse = self.execute(builder, &context).await?;
        Ok(response.results)
    }

    /// Fetch every child block of `block_id`, following the cursor until the
    /// backend reports no more pages (100 blocks per request).
    pub async fn list_block_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let creds = self.credentials()?;
        let context = format!("failed to list child blocks of {block_id}");
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> =
                vec![("page_size", BLOCK_PAGE_SIZE.to_string())];
            if let Some(c) = &cursor {
                query.push(("start_cursor", c.clone()));
            }
            let builder = self
                .authed(
                    self.http
                        .get(format!("{API_BASE}/blocks/{block_id}/children")),
                    &creds.token,
                )
                .query(&query);
            let page: BlockChildrenResponse = self.execute(builder, &context).await?;
            blocks.extend(page.results);

            cursor = match (page.has_more, page.next_cursor) {
                (true, Some(next)) => Some(next),
                _ => None,
            };
            if cursor.is_none() {
                break;
            }
        }

        debug!(block_id, count = blocks.len(), "fetched child blocks");
        Ok(blocks)
    }
}
