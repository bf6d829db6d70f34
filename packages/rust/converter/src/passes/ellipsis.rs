//! Pass 7: ellipses normalized to pairs of `…`.

use std::sync::LazyLock;

use regex::Regex;

use super::replace_with_context;
use crate::PassContext;

const PAIR: &str = "……";
const DASH: char = '―';

static DOT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[.．…]+").expect("valid regex"));

static LEADER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("・{3,}|。{3,}|、{3,}").expect("valid regex"));

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let text = replace_with_context(text, &DOT_RUN, |run, left, right| {
        if left == Some(DASH) || right == Some(DASH) {
            return None;
        }
        Some(dot_run(run))
    });

    let text = replace_with_context(&text, &LEADER_RUN, |run, left, right| {
        if left == Some(DASH) || right == Some(DASH) {
            return None;
        }
        Some(PAIR.repeat(run.chars().count().div_ceil(6)))
    });

    text.replace("。。", "。").replace("、、", "、")
}

/// `……` per two characters; an odd run keeps its last character.
fn dot_run(run: &str) -> String {
    let n = run.chars().count();
    let mut out = PAIR.repeat(n / 2);
    if n % 2 == 1 {
        if let Some(last) = run.chars().next_back() {
            out.push(last);
        }
    }
    out
}
