//! Pass 5: short runs set sideways in vertical text.

use std::sync::LazyLock;

use regex::Regex;

use super::{replace_with_context, tcy};
use crate::PassContext;

static BANGS: LazyLock<Regex> = LazyLock::new(|| Regex::new("！+").expect("valid regex"));

static MARKS: LazyLock<Regex> = LazyLock::new(|| Regex::new("[！？]+").expect("valid regex"));

static ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[０-９Ａ-Ｚａ-ｚ]+").expect("valid regex"));

pub(crate) fn run(text: &str, cx: &PassContext<'_>) -> String {
    let text = replace_with_context(text, &BANGS, |run, left, right| {
        if left == Some('？') || right == Some('？') {
            return None;
        }
        match run.chars().count() {
            3 => Some(tcy("!!!")),
            n if n >= 4 => Some(tcy("!!").repeat(n.div_ceil(2))),
            _ => None,
        }
    });

    let text = replace_with_context(&text, &MARKS, |run, _, _| {
        let len = run.chars().count();
        if len == 2 || (len == 3 && (run == "！！？" || run == "？！！")) {
            Some(tcy(&narrow(run)))
        } else {
            None
        }
    });

    let max = cx.config.tatechuyoko_max_len;
    replace_with_context(&text, &ALNUM, |run, _, _| {
        (2..=max)
            .contains(&run.chars().count())
            .then(|| tcy(&narrow(run)))
    })
}

/// Full-width ASCII variants back to ASCII.
fn narrow(run: &str) -> String {
    run.chars()
        .map(|c| match c {
            '！'..='～' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}
