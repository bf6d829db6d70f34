//! Individual converter passes. Each is a pure `&str -> String` rewrite.

pub(crate) mod bracket_indent;
pub(crate) mod ellipsis;
pub(crate) mod extract;
pub(crate) mod gaiji;
pub(crate) mod line_join;
pub(crate) mod numerals;
pub(crate) mod orthography;
pub(crate) mod spacing;
pub(crate) mod symbols;
pub(crate) mod tatechuyoko;
pub(crate) mod vertical_rule;

use regex::Regex;

/// Map every character through `map`, which returns `None` to keep it.
pub(crate) fn map_chars(text: &str, map: impl Fn(char) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match map(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Replace each match of `re` using its neighbouring characters.
///
/// `f` gets the matched text plus the characters immediately before and after
/// it in the input, and returns `None` to leave the match as is.
pub(crate) fn replace_with_context(
    text: &str,
    re: &Regex,
    f: impl Fn(&str, Option<char>, Option<char>) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        let left = text[..m.start()].chars().next_back();
        let right = text[m.end()..].chars().next();
        match f(m.as_str(), left, right) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Wrap `value` in a tate-chu-yoko directive.
pub(crate) fn tcy(value: &str) -> String {
    format!("［＃縦中横］{value}［＃縦中横終わり］")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_sees_neighbours() {
        let re = Regex::new("b+").expect("valid regex");
        let out = replace_with_context("abbc b", &re, |run, left, right| {
            Some(format!("[{}{}{}]", left.unwrap_or('^'), run.len(), right.unwrap_or('$')))
        });
        assert_eq!(out, "a[a2c]c [ 1$]");
    }

    #[test]
    fn map_chars_keeps_unmapped() {
        let out = map_chars("a-b", |c| (c == '-').then_some("－"));
        assert_eq!(out, "a－b");
    }
}
