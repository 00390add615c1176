// src/toc.rs
// Table-of-contents extraction from converted HTML. The converter assigns
// every heading a sequential `heading-{n}` id; scanning for those here
// keeps the TOC in exact document order without re-walking the block tree.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::TocItem;

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<h([1-3])\s+id="([^"]+)">([^<]+)</h[1-3]>"#).unwrap());

/// Collect h1–h3 headings with ids. No headings yields an empty list.
pub fn extract_headings(html: &str) -> Vec<TocItem> {
    RE_HEADING
        .captures_iter(html)
        .filter_map(|caps| {
            let level: u8 = caps.get(1)?.as_str().parse().ok()?;
            let id = caps.get(2)?.as_str().trim();
            let title = caps.get(3)?.as_str().trim();
            if id.is_empty() || title.is_empty() {
                return None;
            }
            Some(TocItem {
                id: id.to_string(),
                title: title.to_string(),
                level,
            })
        })
        .collect()
}
