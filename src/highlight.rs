// src/highlight.rs
// Decorates the converter's `<pre data-language="…"><code>` blocks with
// the container and language label the front-end highlighter styles.
// The inner <pre> loses its data-language attribute in the process, so
// running the pass twice is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<pre data-language="([^"]*)"><code>(.*?)</code></pre>"#).unwrap()
});

/// Wrap every code block in a labeled container. Content inside <code>
/// is already escaped by the converter and passes through untouched.
pub fn decorate_code_blocks(html: &str) -> String {
    RE_CODE_BLOCK
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let language = &caps[1];
            let code = &caps[2];
            format!(
                "<div class=\"code-block-wrapper\">\
                 <div class=\"code-block-header\"><span class=\"code-block-language\">{language}</span></div>\
                 <pre class=\"shiki\"><code>{code}</code></pre>\
                 </div>"
            )
        })
        .into_owned()
}
