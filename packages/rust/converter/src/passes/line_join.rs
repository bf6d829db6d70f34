//! Pass 10: re-join lines that were wrapped after a comma.

use crate::PassContext;

const PARAGRAPH_OPENERS: &str = "「『(（【<＜〈《≪・■…‥―　";

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| matches!(c, ' ' | '　' | '\t'))
}

/// A line ending in one `、` (not `、、`).
fn ends_with_single_comma(line: &str) -> bool {
    let mut rev = line.chars().rev();
    rev.next() == Some('、') && rev.next().is_some_and(|c| c != '、')
}

/// The rest of `line` after its indent, when the line continues a sentence.
fn continuation(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('　')?;
    let first = rest.chars().next()?;
    let opens_paragraph = PARAGRAPH_OPENERS.contains(first)
        || ('１'..='９').contains(&first)
        || ('\u{4E00}'..='\u{4E5D}').contains(&first);
    (!opens_paragraph).then_some(rest)
}

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let mut line = lines[i].to_string();
        i += 1;

        while ends_with_single_comma(&line) {
            let Some(next) = (i..lines.len()).find(|&j| !is_blank(lines[j])) else {
                break;
            };
            let Some(rest) = continuation(lines[next]) else {
                break;
            };
            line.push_str(rest);
            i = next + 1;
        }

        out.push(line);
    }

    out.join("\n")
}
