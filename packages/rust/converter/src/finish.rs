//! Cleanup after the last pass.

const CLOSING_PUNCTUATION: &[char] = &['。', '！', '？', '!', '?', '」', '』', '）'];

fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '　' | '\t')
}

/// Prose: no trailing whitespace on any line or at the end of the text.
pub(crate) fn prose(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.trim_end_matches(is_inline_space))
        .collect();
    lines.join("\n").trim_end().to_string()
}

/// Headings: one line, pieces separated by an ideographic space.
pub(crate) fn heading(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("　")
}

/// Short line that does not close a sentence.
pub(crate) fn is_heading_like(line: &str, max_len: usize) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= max_len
        && !trimmed.ends_with(CLOSING_PUNCTUATION)
}
