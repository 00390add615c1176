// src/notion/html.rs
// HTML fragment builders shared by the block converter. Free text is
// escaped for content position and attribute values for attribute
// position — these are different character sets and mixing them up is an
// injection defect, so the two wrappers below are the only escape entry
// points the converter uses.

use metrics::counter;
use tracing::debug;

use crate::notion::link_preview::FetchPreview;

/// Escape for text content position: `&`, `<`, `>`.
pub fn escape_content(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape for attribute position: `&`, `"`, `'`, `<`, `>`.
/// Strictly wider than the content set — attribute values must not be able
/// to close their quote, whichever quote style the markup uses.
pub fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Map a callout color name to an inline style.
/// `{color}_background` paints the background and flips the text white;
/// a bare color tints the text; `default` adds nothing.
pub fn callout_style(color: &str) -> String {
    let parts: Vec<&str> = color.split('_').collect();
    if parts.len() == 2 && parts[1] == "background" {
        return format!("background-color: {}; color: white;", parts[0]);
    }
    if parts.len() == 1 && parts[0] != "default" {
        return format!("color: {};", parts[0]);
    }
    String::new()
}

/// Plain anchor for a linked text run.
pub fn render_link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        escape_attribute(href),
        escape_content(label)
    )
}

/// Resolve `href` to a preview and render a bookmark card. Preview fetch is
/// the converter's failure-prone step: on any error we degrade to a plain
/// escaped anchor instead of failing the whole document.
pub async fn render_bookmark_card(previews: &dyn FetchPreview, href: &str) -> String {
    let preview = match previews.fetch_preview(href).await {
        Ok(preview) => preview,
        Err(error) => {
            debug!(url = href, %error, "link preview failed, falling back to plain anchor");
            counter!("blog_bookmark_fallbacks_total").increment(1);
            return render_link(href, href);
        }
    };

    let url = preview.url.as_deref().unwrap_or(href);
    let title = preview.title.as_deref().unwrap_or("");
    let description = preview.description.as_deref().unwrap_or("");
    let favicon = preview.favicon.as_deref().unwrap_or("");
    let image = preview.image.as_deref().unwrap_or("");

    let escaped_url = escape_attribute(url);
    let mut card = format!(
        "<a href=\"{escaped_url}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"not-prose my-4 flex w-full overflow-hidden rounded-md border border-slate-200 bg-white no-underline transition hover:border-slate-300 hover:shadow-sm hover:no-underline\">"
    );
    card.push_str("<div class=\"flex min-w-0 flex-1 flex-col justify-center p-3\">");
    if !title.is_empty() {
        card.push_str(&format!(
            "<div class=\"text-sm font-medium leading-snug text-slate-900\">{}</div>",
            escape_attribute(title)
        ));
    }
    if !description.is_empty() {
        card.push_str(&format!(
            "<div class=\"mt-1 line-clamp-2 text-xs leading-relaxed text-slate-500\">{}</div>",
            escape_content(description)
        ));
    }
    card.push_str("<div class=\"mt-1.5 flex items-center gap-1.5 text-xs text-slate-400\">");
    if !favicon.is_empty() {
        card.push_str(&format!(
            "<img src=\"{}\" alt=\"\" class=\"h-3.5 w-3.5 shrink-0\" loading=\"lazy\" />",
            escape_attribute(favicon)
        ));
    }
    card.push_str(&format!("<span class=\"truncate\">{escaped_url}</span></div></div>"));
    if !image.is_empty() {
        card.push_str(&format!(
            "<div class=\"hidden h-24 w-40 shrink-0 sm:block\"><img src=\"{}\" alt=\"\" class=\"h-full w-full object-cover\" loading=\"lazy\" /></div>",
            escape_attribute(image)
        ));
    }
    card.push_str("</a>");
    card
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_and_attribute_escapes_differ() {
        assert_eq!(escape_content("a < b & c"), "a &lt; b &amp; c");
        // Quotes pass through in content position but not in attributes.
        assert_eq!(escape_content("say \"hi\""), "say \"hi\"");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_attribute("it's"), "it&#x27;s");
    }

    #[test]
    fn link_cannot_break_out_of_attribute() {
        let html = render_link("https://x.example/?q=\"><script>", "<script>alert(1)</script>");
        assert!(!html.contains("\"><script>"), "raw quote must not close the attribute: {html}");
        assert!(!html.contains("<script>"), "label must be escaped: {html}");
    }

    #[test]
    fn callout_style_variants() {
        assert_eq!(callout_style("red_background"), "background-color: red; color: white;");
        assert_eq!(callout_style("blue"), "color: blue;");
        assert_eq!(callout_style("default"), "");
    }
}
