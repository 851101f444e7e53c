use regex::Regex;
use std::sync::LazyLock;

/// Longest caption segment sent to memegen, counted in characters after escaping.
pub const MAX_CAPTION_CHARS: usize = 100;

// List markers, numbering and quotes the model sometimes adds despite the prompt.
static LEADING_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["'\-*0-9.]+\s*"#).expect("static regex"));
static TRAILING_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']$"#).expect("static regex"));

/// Turns raw model output into exactly `count` captions.
///
/// Lines are cleaned of list markers and quotes, blank ones dropped, extra ones
/// discarded, and missing ones filled with the topic itself.
pub fn sanitize_captions(raw: &str, count: usize, topic: &str) -> Vec<String> {
    let mut captions: Vec<String> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .take(count)
        .collect();

    while captions.len() < count {
        captions.push(topic.to_string());
    }
    captions
}

fn clean_line(line: &str) -> String {
    let line = line.trim();
    let line = LEADING_NOISE.replace(line, "");
    TRAILING_QUOTE.replace(&line, "").trim().to_string()
}

/// Escapes the characters memegen reserves in path segments and caps the length.
///
/// The result still needs percent-encoding, which happens when it is pushed
/// onto the request URL as a path segment.
pub fn encode_caption(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' ' => escaped.push('_'),
            '?' => escaped.push_str("~q"),
            '%' => escaped.push_str("~p"),
            '/' => escaped.push_str("~s"),
            '#' => escaped.push_str("~h"),
            other => escaped.push(other),
        }
    }
    let mut escaped: String = escaped.chars().take(MAX_CAPTION_CHARS).collect();
    // URL path handling collapses bare `.` and `..` segments.
    if escaped == "." || escaped == ".." {
        escaped.push('_');
    }
    escaped
}
