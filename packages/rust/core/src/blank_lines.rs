//! Whole-document blank-line normalization.
//!
//! Boundary markers are scene breaks (a line of five or more `＊`, or a line of
//! `◆◇■□●○★☆` only) and whole chapter heading lines
//! (`［＃３字下げ］［＃大見出し］…［＃大見出し終わり］`). Every marker gets a
//! blank line before and after it. Blank runs then collapse to
//! `blank_lines_max`, except the run right after a chapter heading, which
//! becomes `blank_lines_after_chapter`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use aozorakit_shared::LayoutConfig;

/// Marks the top-level chapter heading line.
pub const CHAPTER_MARKER: &str = "［＃大見出し］";

static CHAPTER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "^［＃３字下げ］{}.*［＃大見出し終わり］$",
        regex::escape(CHAPTER_MARKER)
    ))
    .expect("valid regex")
});

static ASTERISK_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[＊*]{5,}$").expect("valid regex"));

static GLYPH_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[◆◇■□●○★☆]+$").expect("valid regex"));

const SCENE_BREAK_INDENT: &str = "　　　　";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Blank,
    SceneBreak(String),
    Chapter(String),
    Text(String),
}

fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '　' | '\t')
}

fn classify(line: &str) -> Line {
    let stripped = line.trim_matches(is_inline_space);
    if stripped.is_empty() {
        return Line::Blank;
    }
    if ASTERISK_RULE.is_match(stripped) {
        return Line::SceneBreak(format!("{SCENE_BREAK_INDENT}{}", stripped.replace('*', "＊")));
    }
    if GLYPH_RULE.is_match(stripped) {
        return Line::SceneBreak(format!("{SCENE_BREAK_INDENT}{stripped}"));
    }

    let kept = line.trim_end_matches(is_inline_space).to_string();
    if CHAPTER_LINE.is_match(&kept) {
        Line::Chapter(kept)
    } else {
        Line::Text(kept)
    }
}

/// Normalize blank lines across a whole document.
///
/// The result has no leading or trailing blank lines and no trailing
/// whitespace on any line.
#[instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn normalize(text: &str, layout: &LayoutConfig) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending_blank = false;
    let mut after_chapter = false;
    let mut markers = 0usize;

    for raw in text.split('\n') {
        let (content, is_marker, is_chapter) = match classify(raw) {
            Line::Blank => {
                pending_blank = true;
                continue;
            }
            Line::SceneBreak(s) => (s, true, false),
            Line::Chapter(s) => (s, true, true),
            Line::Text(s) => (s, false, false),
        };

        if (pending_blank || is_marker) && !out.is_empty() {
            let count = if after_chapter {
                layout.blank_lines_after_chapter
            } else {
                layout.blank_lines_max
            };
            out.extend(std::iter::repeat_n(String::new(), count));
        }

        out.push(content);
        pending_blank = is_marker;
        after_chapter = is_chapter;
        markers += usize::from(is_marker);
    }

    debug!(lines = out.len(), markers, "blank lines normalized");
    out.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
