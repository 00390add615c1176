// src/notion/types.rs
// Serde models for the structured-content backend's JSON. Page properties
// stay dynamic (serde_json::Value) because the property naming is not
// guaranteed consistent — the mapper resolves them through fallback
// chains. Blocks are typed: the converter dispatches on the type tag, and
// anything we don't recognize decodes to `Unsupported` so unknown block
// types never break traversal.

use serde::Deserialize;
use serde_json::Value;

/// One record of the datasource; `properties` is resolved by the post mapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub struct BlockChildrenResponse {
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One node of a document tree. Children are not inlined — `has_children`
/// signals that they must be fetched separately.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub content: BlockContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BlockContent {
    #[serde(rename = "paragraph")]
    Paragraph { paragraph: RichTextContent },
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: RichTextContent },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: RichTextContent },
    #[serde(rename = "heading_3")]
    Heading3 { heading_3: RichTextContent },
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem { bulleted_list_item: RichTextContent },
    #[serde(rename = "numbered_list_item")]
    NumberedListItem { numbered_list_item: RichTextContent },
    #[serde(rename = "code")]
    Code { code: CodeContent },
    #[serde(rename = "quote")]
    Quote { quote: RichTextContent },
    #[serde(rename = "bookmark")]
    Bookmark { bookmark: BookmarkContent },
    #[serde(rename = "image")]
    Image { image: ImageContent },
    #[serde(rename = "callout")]
    Callout { callout: CalloutContent },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichTextContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

impl RichTextContent {
    /// Concatenated plain text of every run.
    pub fn plain_text(&self) -> String {
        self.rich_text
            .iter()
            .map(|run| run.plain_text.as_str())
            .collect()
    }
}

/// One styled/linked span of text within a block.
#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(rename = "type", default)]
    pub kind: RichTextKind,
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RichTextKind {
    #[default]
    Text,
    Mention,
    Other,
}

impl From<String> for RichTextKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "text" => RichTextKind::Text,
            "mention" => RichTextKind::Mention,
            _ => RichTextKind::Other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CodeContent {
    pub fn plain_text(&self) -> String {
        self.rich_text
            .iter()
            .map(|run| run.plain_text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkContent {
    #[serde(default)]
    pub url: Option<String>,
}

/// Media lives either on an external URL or as a backend-hosted file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageContent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub external: Option<FileUrl>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

impl ImageContent {
    pub fn url(&self) -> Option<&str> {
        match self.kind.as_deref() {
            Some("external") => self.external.as_ref().map(|f| f.url.as_str()),
            Some("file") => self.file.as_ref().map(|f| f.url.as_str()),
            _ => None,
        }
    }

    pub fn caption_text(&self) -> String {
        self.caption
            .iter()
            .map(|run| run.plain_text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalloutContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

impl CalloutContent {
    pub fn plain_text(&self) -> String {
        self.rich_text
            .iter()
            .map(|run| run.plain_text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Icon {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub external: Option<FileUrl>,
    #[serde(default)]
    pub file: Option<FileUrl>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_block_types_decode_as_unsupported() {
        let block: Block = serde_json::from_value(json!({
            "id": "b1",
            "type": "synced_block",
            "synced_block": {},
            "has_children": true,
        }))
        .unwrap();
        assert!(matches!(block.content, BlockContent::Unsupported));
        assert!(block.has_children);
    }

    #[test]
    fn paragraph_rich_text_decodes_runs() {
        let block: Block = serde_json::from_value(json!({
            "id": "b2",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [
                    { "type": "text", "plain_text": "hello ", "href": null },
                    { "type": "mention", "plain_text": "ref", "href": "https://example.com" },
                ]
            }
        }))
        .unwrap();
        let BlockContent::Paragraph { paragraph } = &block.content else {
            panic!("expected paragraph");
        };
        assert_eq!(paragraph.rich_text.len(), 2);
        assert_eq!(paragraph.rich_text[0].kind, RichTextKind::Text);
        assert_eq!(paragraph.rich_text[1].kind, RichTextKind::Mention);
        assert_eq!(paragraph.plain_text(), "hello ref");
    }

    #[test]
    fn image_url_follows_the_variant_tag() {
        let external: ImageContent = serde_json::from_value(json!({
            "type": "external",
            "external": { "url": "https://img.example/a.png" },
            "caption": []
        }))
        .unwrap();
        assert_eq!(external.url(), Some("https://img.example/a.png"));

        let hosted: ImageContent = serde_json::from_value(json!({
            "type": "file",
            "file": { "url": "https://files.example/b.png" },
            "caption": []
        }))
        .unwrap();
        assert_eq!(hosted.url(), Some("https://files.example/b.png"));
    }
}
