use scraper::ElementRef;

/// Configuration options for paragraph text extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Whether to collapse whitespace runs inside each paragraph
    pub normalize_whitespace: bool,
}

/// Concatenates every text node below an element, untouched
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of one paragraph according to options
pub fn paragraph_text(element: ElementRef<'_>, options: &TextOptions) -> String {
    let text = element_text(element);
    if options.normalize_whitespace {
        normalize_whitespace_in_segment(&text)
    } else {
        text
    }
}

/// Joins paragraph texts with one newline each.
///
/// Empty paragraphs are kept as empty lines, so `["A", "", "B"]` becomes `"A\n\nB"`.
pub fn join_paragraphs(paragraphs: &[String]) -> String {
    paragraphs.join("\n")
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
