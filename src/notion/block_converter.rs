// src/notion/block_converter.rs
// Depth-first conversion of a content-block tree into an HTML string.
// Each block renders its own markup, then the HTML of its lazily-fetched
// children. The heading counter is owned by the converter and threaded
// through the whole traversal, so heading ids are strictly sequential in
// document order no matter how deep a heading is nested — the table of
// contents depends on that ordering.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::Result;
use crate::notion::html::{
    callout_style, escape_attribute, escape_content, render_bookmark_card, render_link,
};
use crate::notion::link_preview::FetchPreview;
use crate::notion::list_wrapper::wrap_list_items;
use crate::notion::types::{Block, BlockContent, RichText, RichTextKind};

/// Where child blocks come from. The real implementation is the backend
/// client; tests substitute an in-memory tree.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn child_blocks(&self, block_id: &str) -> Result<Vec<Block>>;
}

pub struct BlockConverter<'a> {
    blocks: &'a dyn BlockSource,
    previews: &'a dyn FetchPreview,
    heading_seq: u32,
}

impl<'a> BlockConverter<'a> {
    pub fn new(blocks: &'a dyn BlockSource, previews: &'a dyn FetchPreview) -> Self {
        Self {
            blocks,
            previews,
            heading_seq: 0,
        }
    }

    /// Convert a sibling sequence: each block in order, then one list-merge
    /// pass over the results. Used for the document's top level and for
    /// every block's children.
    pub async fn convert_all(&mut self, blocks: &[Block]) -> Result<String> {
        let mut parts = Vec::with_capacity(blocks.len());
        for block in blocks {
            parts.push(self.convert_block(block).await?);
        }
        Ok(wrap_list_items(&parts))
    }

    fn next_heading_id(&mut self) -> String {
        self.heading_seq += 1;
        format!("heading-{}", self.heading_seq)
    }

    fn convert_block<'b>(&'b mut self, block: &'b Block) -> BoxFuture<'b, Result<String>> {
        Box::pin(async move {
            // Children are fetched lazily, only when the block declares them.
            let children_html = if block.has_children {
                let children = self.blocks.child_blocks(&block.id).await?;
                self.convert_all(&children).await?
            } else {
                String::new()
            };

            let html = match &block.content {
                BlockContent::Paragraph { paragraph } => {
                    self.convert_paragraph(&paragraph.rich_text, children_html).await
                }
                BlockContent::Heading1 { heading_1 } => {
                    let id = self.next_heading_id();
                    format!(
                        "<h1 id=\"{id}\">{}</h1>{children_html}",
                        escape_content(&heading_1.plain_text())
                    )
                }
                BlockContent::Heading2 { heading_2 } => {
                    let id = self.next_heading_id();
                    format!(
                        "<h2 id=\"{id}\">{}</h2>{children_html}",
                        escape_content(&heading_2.plain_text())
                    )
                }
                BlockContent::Heading3 { heading_3 } => {
                    let id = self.next_heading_id();
                    format!(
                        "<h3 id=\"{id}\">{}</h3>{children_html}",
                        escape_content(&heading_3.plain_text())
                    )
                }
                BlockContent::BulletedListItem { bulleted_list_item } => format!(
                    "<li data-list-type=\"bulleted\">{}{children_html}</li>",
                    escape_content(&bulleted_list_item.plain_text())
                ),
                BlockContent::NumberedListItem { numbered_list_item } => format!(
                    "<li data-list-type=\"numbered\">{}{children_html}</li>",
                    escape_content(&numbered_list_item.plain_text())
                ),
                BlockContent::Code { code } => {
                    let language = code.language.as_deref().unwrap_or("plain text");
                    format!(
                        "<pre data-language=\"{}\"><code>{}</code></pre>",
                        escape_attribute(language),
                        escape_content(&code.plain_text())
                    )
                }
                BlockContent::Quote { quote } => format!(
                    "<blockquote>{}{children_html}</blockquote>",
                    escape_content(&quote.plain_text())
                ),
                BlockContent::Bookmark { bookmark } => {
                    let url = bookmark.url.as_deref().unwrap_or("");
                    render_bookmark_card(self.previews, url).await
                }
                BlockContent::Image { image } => match image.url() {
                    None => String::new(),
                    Some(url) => {
                        let caption = image.caption_text();
                        let alt = if caption.is_empty() { "Image" } else { caption.as_str() };
                        let mut figure = format!(
                            "<figure class=\"my-4\"><img src=\"{}\" alt=\"{}\" class=\"w-full rounded-lg\" />",
                            escape_attribute(url),
                            escape_attribute(alt)
                        );
                        if !caption.is_empty() {
                            figure.push_str(&format!(
                                "<figcaption class=\"text-sm text-muted-foreground mt-2 text-center\">{}</figcaption>",
                                escape_content(&caption)
                            ));
                        }
                        figure.push_str("</figure>");
                        figure
                    }
                },
                BlockContent::Callout { callout } => {
                    let icon_html = match callout.icon.as_ref() {
                        Some(icon) => match icon.kind.as_deref() {
                            Some("emoji") => icon
                                .emoji
                                .as_deref()
                                .map(|e| format!("<span class=\"notion-callout-icon\">{e}</span>"))
                                .unwrap_or_default(),
                            Some("external") => icon
                                .external
                                .as_ref()
                                .map(|f| icon_img(&f.url))
                                .unwrap_or_default(),
                            Some("file") => icon
                                .file
                                .as_ref()
                                .map(|f| icon_img(&f.url))
                                .unwrap_or_default(),
                            _ => String::new(),
                        },
                        None => String::new(),
                    };

                    let style = callout_style(callout.color.as_deref().unwrap_or("default"));
                    let style_attr = if style.is_empty() {
                        String::new()
                    } else {
                        format!(" style=\"{style}\"")
                    };
                    format!(
                        "<div class=\"notion-callout bg-gradient-to-br from-white-500/50 to-white-500/10 shadow-sm\"{style_attr}>{icon_html}<span class=\"notion-callout-text\">{}</span></div>{children_html}",
                        escape_content(&callout.plain_text())
                    )
                }
                // Unknown block types lose their own content but never
                // break traversal.
                BlockContent::Unsupported => children_html,
            };

            Ok(html)
        })
    }

    /// A paragraph is a sequence of rich-text runs. Mention runs with a
    /// target resolve to bookmark cards; those are block-level visually, so
    /// a paragraph containing any mention is emitted unwrapped.
    async fn convert_paragraph(&mut self, runs: &[RichText], children_html: String) -> String {
        if runs.is_empty() {
            return children_html;
        }

        let mut parts = Vec::with_capacity(runs.len());
        for run in runs {
            let part = match (run.kind, run.href.as_deref()) {
                (RichTextKind::Mention, Some(href)) => {
                    render_bookmark_card(self.previews, href).await
                }
                (RichTextKind::Text, Some(href)) => {
                    let label = if run.plain_text.is_empty() { href } else { run.plain_text.as_str() };
                    render_link(href, label)
                }
                _ => escape_content(&run.plain_text),
            };
            parts.push(part);
        }

        let has_mention = runs.iter().any(|run| run.kind == RichTextKind::Mention);
        if has_mention {
            format!("{}{children_html}", parts.join(""))
        } else {
            format!("<p>{}</p>{children_html}", parts.join(""))
        }
    }
}

fn icon_img(url: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"\" class=\"notion-callout-icon-img\" />",
        escape_attribute(url)
    )
}
