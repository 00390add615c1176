// src/notion/mod.rs
// Everything specific to the structured-content backend: the REST client,
// the block/record models, record-to-post mapping, and the block-to-HTML
// conversion pipeline.

pub mod block_converter;
pub mod client;
pub mod html;
pub mod link_preview;
pub mod list_wrapper;
pub mod post_mapper;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
impl block_converter::BlockSource for client::NotionClient {
    async fn child_blocks(&self, block_id: &str) -> Result<Vec<types::Block>> {
        self.list_block_children(block_id).await
    }
}
