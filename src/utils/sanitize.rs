// Sanitization utilities

/// Reduce user input to plain text: markup is removed (script and style
/// bodies included) and the text itself is kept unescaped.
pub fn strip_markup(text: &str) -> String {
    let cleaned = ammonia::Builder::empty().clean(text.trim()).to_string();

    // the serializer escapes text nodes; undo it since the result is not HTML
    cleaned
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Truncate text to at most `max_chars` characters, adding "..." when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
