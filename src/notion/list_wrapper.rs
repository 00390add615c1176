// src/notion/list_wrapper.rs
// Consecutive provisional list items of the same kind are coalesced into
// one enclosing <ul>/<ol>. The converter emits each list item with a
// data-list-type tag; this pass groups contiguous runs, strips the tag,
// and flushes on any boundary (different kind, non-list fragment, end).
// Applied at every sibling level, so nested lists merge too.

const BULLETED_PREFIX: &str = "<li data-list-type=\"bulleted\">";
const NUMBERED_PREFIX: &str = "<li data-list-type=\"numbered\">";

#[derive(Clone, Copy, PartialEq)]
enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "ul",
            ListKind::Numbered => "ol",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            ListKind::Bulleted => " data-list-type=\"bulleted\"",
            ListKind::Numbered => " data-list-type=\"numbered\"",
        }
    }
}

/// Merge sibling HTML fragments, wrapping each contiguous run of same-kind
/// list items in exactly one list element.
pub fn wrap_list_items(fragments: &[String]) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut run_kind: Option<ListKind> = None;
    let mut run_items: Vec<String> = Vec::new();

    fn flush(result: &mut Vec<String>, kind: &mut Option<ListKind>, items: &mut Vec<String>) {
        if let Some(k) = kind.take() {
            if !items.is_empty() {
                result.push(format!("<{tag}>{body}</{tag}>", tag = k.tag(), body = items.join("")));
            }
        }
        items.clear();
    }

    for fragment in fragments {
        let kind = if fragment.starts_with(BULLETED_PREFIX) {
            Some(ListKind::Bulleted)
        } else if fragment.starts_with(NUMBERED_PREFIX) {
            Some(ListKind::Numbered)
        } else {
            None
        };

        match kind {
            Some(k) => {
                if run_kind != Some(k) {
                    flush(&mut result, &mut run_kind, &mut run_items);
                    run_kind = Some(k);
                }
                run_items.push(fragment.replacen(k.marker(), "", 1));
            }
            None => {
                flush(&mut result, &mut run_kind, &mut run_items);
                if !fragment.trim().is_empty() {
                    result.push(fragment.clone());
                }
            }
        }
    }
    flush(&mut result, &mut run_kind, &mut run_items);

    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn li(kind: &str, body: &str) -> String {
        format!("<li data-list-type=\"{kind}\">{body}</li>")
    }

    #[test]
    fn one_list_per_contiguous_run() {
        let fragments = vec![
            li("bulleted", "a"),
            li("bulleted", "b"),
            li("bulleted", "c"),
            li("numbered", "1"),
        ];
        assert_eq!(
            wrap_list_items(&fragments),
            "<ul><li>a</li><li>b</li><li>c</li></ul>\n<ol><li>1</li></ol>"
        );
    }

    #[test]
    fn non_list_fragment_breaks_the_run() {
        let fragments = vec![
            li("bulleted", "a"),
            "<p>between</p>".to_string(),
            li("bulleted", "b"),
        ];
        assert_eq!(
            wrap_list_items(&fragments),
            "<ul><li>a</li></ul>\n<p>between</p>\n<ul><li>b</li></ul>"
        );
    }

    #[test]
    fn blank_fragments_are_dropped() {
        let fragments = vec!["".to_string(), li("numbered", "only"), "  ".to_string()];
        assert_eq!(wrap_list_items(&fragments), "<ol><li>only</li></ol>");
    }

    #[test]
    fn nested_marker_inside_item_is_untouched() {
        // Only the item's own marker is stripped; children were already
        // wrapped at their level and carry no markers, but a literal
        // occurrence inside text must survive.
        let inner = li("bulleted", "outer<ul><li>inner</li></ul>");
        assert_eq!(
            wrap_list_items(&[inner]),
            "<ul><li>outer<ul><li>inner</li></ul></li></ul>"
        );
    }
}
