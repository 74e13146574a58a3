//! Queryable wrapper around a parsed page

use scraper::{ElementRef, Html, Selector};

/// Elements whose text never reaches the reader
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start and end a line of text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "blockquote", "section", "article", "header", "footer", "pre",
];

/// A rendered post document, queryable by CSS selector
///
/// Built from the markup returned by a fetch and dropped once the record for
/// that post has been assembled.
pub struct RenderedDocument {
    html: Html,
}

impl RenderedDocument {
    /// Parses rendered markup into a document tree
    ///
    /// Parsing is lenient: malformed markup still produces a (possibly
    /// sparse) tree.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Returns the first element matching `selector` in document order
    ///
    /// A selector that fails to parse matches nothing.
    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = compile(selector)?;
        self.html.select(&selector).next()
    }

    /// Returns every element matching `selector` in document order
    ///
    /// Each element appears once even when it matches several members of a
    /// comma-separated selector group.
    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match compile(selector) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::trace!("Ignoring unparsable selector {:?}: {:?}", selector, e);
            None
        }
    }
}

/// Concatenated text of an element, trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Visible text of a subtree with one line per block
///
/// Inline runs inside a block keep their spacing, whitespace within a block
/// is collapsed, and line breaks appear only at block boundaries and `<br>`.
/// Text inside script-like elements is skipped and empty blocks are dropped.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut lines = BlockLines::default();
    collect_visible_text(element, &mut lines);
    lines.finish()
}

#[derive(Default)]
struct BlockLines {
    lines: Vec<String>,
    current: String,
}

impl BlockLines {
    fn push_text(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

fn collect_visible_text(element: ElementRef<'_>, lines: &mut BlockLines) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            lines.push_text(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if HIDDEN_TAGS.contains(&name) {
                continue;
            }
            if name == "br" {
                lines.break_line();
            } else if BLOCK_TAGS.contains(&name) {
                lines.break_line();
                collect_visible_text(child_element, lines);
                lines.break_line();
            } else {
                collect_visible_text(child_element, lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_first_in_document_order() {
        let doc = RenderedDocument::parse(
            r#"<div class="b">second</div><div class="a">first</div>"#,
        );
        let found = doc.select_first(".a, .b").unwrap();
        assert_eq!(element_text(found), "second");
    }

    #[test]
    fn test_select_all_unions_without_duplicates() {
        let doc = RenderedDocument::parse(
            r#"<img class="x y"><img class="x"><span class="y"></span>"#,
        );
        assert_eq!(doc.select_all(".x, .y").len(), 3);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = RenderedDocument::parse("<p>text</p>");
        assert!(doc.select_first("p[[[").is_none());
        assert!(doc.select_all("p[[[").is_empty());
    }

    #[test]
    fn test_visible_text_joins_runs() {
        let doc = RenderedDocument::parse(
            "<div id=\"c\"><p>  first line </p><p>second</p>\n\n<p> </p><span>third</span></div>",
        );
        let element = doc.select_first("#c").unwrap();
        assert_eq!(visible_text(element), "first line\nsecond\nthird");
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let doc = RenderedDocument::parse(
            "<div id=\"c\"><p>shown</p><script>var hidden = 1;</script><style>p{}</style></div>",
        );
        let element = doc.select_first("#c").unwrap();
        assert_eq!(visible_text(element), "shown");
    }

    #[test]
    fn test_visible_text_keeps_inline_runs_together() {
        let doc = RenderedDocument::parse(
            "<div id=\"c\"><p>Hello <b>bold</b> world</p><p>Next <a href=\"#\">link</a>.</p></div>",
        );
        let element = doc.select_first("#c").unwrap();
        assert_eq!(visible_text(element), "Hello bold world\nNext link.");
    }

    #[test]
    fn test_visible_text_collapses_whitespace_and_breaks_on_br() {
        let doc = RenderedDocument::parse(
            "<div id=\"c\"><p>  spaced\n\t  <span>out</span>  </p><span>line one</span><br><span>line two</span><ul><li>item</li></ul></div>",
        );
        let element = doc.select_first("#c").unwrap();
        assert_eq!(visible_text(element), "spaced out\nline one\nline two\nitem");
    }
}
