//! Pass 9: stray `｜` → vertical rule note.

use std::sync::LazyLock;

use regex::Regex;

use crate::PassContext;

static RUBY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"｜[^｜《》\n]+《[^《》\n]+》").expect("valid regex"));

const RULE: &str = "※［＃縦線］";

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in RUBY.find_iter(text) {
        out.push_str(&text[last..m.start()].replace('｜', RULE));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&text[last..].replace('｜', RULE));
    out
}
