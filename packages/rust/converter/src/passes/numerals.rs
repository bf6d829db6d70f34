//! Pass 3: numerals → full-width digits.
//!
//! Half-width digits always widen. Kanji digits stay kanji unless they touch a
//! Latin letter or a unit sign (`Ａ一`, `三％`), and even then a table of kanji
//! idioms is never rewritten.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::PassContext;

/// Kanji-numeral idioms restored verbatim after conversion.
pub const NUMERAL_EXCEPTIONS: &[&str] = &[
    "一二を争",
    "七五三",
    "四六時中",
    "三三五五",
    "二三日",
    "二三度",
    "二三人",
    "四五日",
    "四五人",
    "五六人",
    "十中八九",
    "五七五",
    "七五調",
];

const KANJI_DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9０-９〇一二三四五六七八九]+)[.．]([0-9０-９〇一二三四五六七八九])")
        .expect("valid regex")
});

static KANJI_AFTER_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([Ａ-Ｚａ-ｚ])([〇一二三四五六七八九・～]+)").expect("valid regex")
});

static KANJI_BEFORE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([〇一二三四五六七八九・～]+)([Ａ-Ｚａ-ｚ％㎜㎝㎞㎎㎏㏄㎡㎥])").expect("valid regex")
});

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let decimal = DECIMAL.replace_all(text, "${1}・${2}");
    let widened: String = decimal.chars().map(widen_ascii_digit).collect();
    let converted = KANJI_AFTER_LETTER.replace_all(&widened, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], kanji_to_digits(&caps[2]))
    });
    let converted = KANJI_BEFORE_UNIT.replace_all(&converted, |caps: &Captures<'_>| {
        format!("{}{}", kanji_to_digits(&caps[1]), &caps[2])
    });
    revert_exceptions(&decimal, &converted)
}

fn widen_ascii_digit(c: char) -> char {
    if c.is_ascii_digit() {
        char::from_u32(c as u32 + 0xFEE0).unwrap_or(c)
    } else {
        c
    }
}

fn kanji_to_digits(run: &str) -> String {
    run.chars().map(kanji_to_digit).collect()
}

fn kanji_to_digit(c: char) -> char {
    KANJI_DIGITS
        .iter()
        .position(|k| *k == c)
        .and_then(|i| char::from_u32('０' as u32 + i as u32))
        .unwrap_or(c)
}

/// Put back every exception idiom found in `original`.
///
/// Both strings hold the same number of characters because every rewrite
/// above maps one character to one character.
fn revert_exceptions(original: &str, converted: &str) -> String {
    let before: Vec<char> = original.chars().collect();
    let mut after: Vec<char> = converted.chars().collect();
    if before.len() != after.len() {
        return converted.to_string();
    }

    for idiom in NUMERAL_EXCEPTIONS {
        for (byte_start, matched) in original.match_indices(idiom) {
            let start = original[..byte_start].chars().count();
            let len = matched.chars().count();
            after[start..start + len].copy_from_slice(&before[start..start + len]);
        }
    }
    after.into_iter().collect()
}
