use scraper::Html;

/// Extract plain text from HTML markup by concatenating text-node content,
/// preserving word boundaries around block elements. This is text extraction
/// for display summaries, not sanitization.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            text.push_str(text_node);
        }
        // Add space after block elements to preserve word boundaries
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" | "br" | "div" | "li" => text.push(' '),
                _ => {}
            }
        }
    }

    // Collapse whitespace and trim
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
