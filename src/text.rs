//! Plain-text rendering of item bodies.
//!
//! Story and comment text arrives as a small HTML subset: `<p>` between
//! paragraphs, `<a>`, `<i>`, `<pre><code>`, and escaped entities.

use scraper::Html;

/// Strip markup and decode entities, keeping paragraph breaks.
///
/// Whitespace inside text nodes is left alone so `<pre>` blocks keep their
/// layout.
pub fn html_to_plain(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();

    for node in fragment.root_element().descendants() {
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" => text.push_str("\n\n"),
                "br" => text.push('\n'),
                _ => {}
            }
        }
        if let Some(chunk) = node.value().as_text() {
            text.push_str(chunk);
        }
    }

    text.trim().to_string()
}
