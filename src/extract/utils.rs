use scraper::ElementRef;

/// Visible text of an element: all descendant text nodes joined, whitespace runs
/// collapsed to a single space, ends trimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    clean_str(&el.text().collect::<String>())
}

pub fn clean_str(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
