//! Pass 6: fixed orthographic replacements.

use std::sync::LazyLock;

use regex::Regex;

use crate::PassContext;

const REPLACEMENTS: [(&str, &str); 4] = [("。」", "」"), ("。』", "』"), ("。）", "）"), ("。　", "。")];

static WIDE_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new("　{3,}").expect("valid regex"));

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let text = REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, &(from, to)| acc.replace(from, to));
    WIDE_GAP.replace_all(&text, "　　").into_owned()
}
