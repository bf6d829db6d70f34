//! Pass 2: half-width symbols and Latin letters → full-width.
//!
//! Quote pairs are normalized to `〝…〟` first. The pass is idempotent:
//! nothing it emits is matched again.

use std::sync::LazyLock;

use regex::Regex;

use crate::PassContext;

static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['‘]([^"\n]+?)['’]"#).expect("valid regex"));

static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“〝]([^"\n]+?)["”〟]"#).expect("valid regex"));

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let text = SINGLE_QUOTED.replace_all(text, "〝${1}〟");
    let text = DOUBLE_QUOTED.replace_all(&text, "〝${1}〟");
    text.chars().map(to_full_width).collect()
}

fn to_full_width(c: char) -> char {
    match c {
        '-' | '‐' => '－',
        '=' => '＝',
        '+' => '＋',
        '/' => '／',
        '*' => '＊',
        '《' => '≪',
        '》' => '≫',
        '\'' => '’',
        '"' => '〝',
        '%' => '％',
        '$' => '＄',
        '#' => '＃',
        '&' => '＆',
        '!' => '！',
        '?' => '？',
        '<' | '＜' => '〈',
        '>' | '＞' => '〉',
        '(' => '（',
        ')' => '）',
        '|' => '｜',
        ',' => '，',
        '.' => '．',
        '_' => '＿',
        ';' => '；',
        ':' => '：',
        '[' => '［',
        ']' => '］',
        '{' => '｛',
        '}' => '｝',
        '\\' => '￥',
        '—' => '―',
        'a'..='z' | 'A'..='Z' => char::from_u32(c as u32 + 0xFEE0).unwrap_or(c),
        _ => c,
    }
}
