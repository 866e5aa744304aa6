//! Pulls Mermaid markup out of a chat completion.

const BACKTICK: char = '`';

/// Contents of every backtick-delimited span, in order.
///
/// Spans are non-overlapping and closed by the nearest following backtick, so newlines are
/// allowed inside them. A trailing unmatched backtick is ignored.
fn backtick_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch != BACKTICK {
            continue;
        }
        match open.take() {
            Some(start) => spans.push(&text[start..idx]),
            None => open = Some(idx + BACKTICK.len_utf8()),
        }
    }

    spans
}

/// Markup found between backticks, joined with newlines; the whole text when there is none.
pub fn extract_diagram(completion: &str) -> String {
    let spans = backtick_spans(completion);
    if spans.is_empty() {
        completion.to_string()
    } else {
        spans.join("\n")
    }
}
