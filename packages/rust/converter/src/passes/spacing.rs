//! Pass 4: ideographic space after `！`/`？` runs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::PassContext;

static AFTER_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([!?！？]+)([^!?！？\n])").expect("valid regex"));

/// Characters that may follow a mark directly.
const CLOSERS: &str = "」］｝] }』】〉》〕＞>≫)）\"”’〟　☆★♪［―";

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    AFTER_MARK
        .replace_all(text, |caps: &Captures<'_>| {
            let marks = &caps[1];
            let next = match &caps[2] {
                " " | "　" | "、" | "。" => "　",
                other => other,
            };
            if CLOSERS.contains(next) {
                format!("{marks}{next}")
            } else {
                format!("{marks}　{next}")
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use aozorakit_shared::{ContentRole, ConverterConfig};

    fn spacing(text: &str) -> String {
        let config = ConverterConfig::default();
        run(
            text,
            &PassContext {
                role: ContentRole::Body,
                config: &config,
            },
        )
    }

    #[test]
    fn space_inserted_before_text() {
        assert_eq!(spacing("え！？本当"), "え！？　本当");
    }

    #[test]
    fn punctuation_after_mark_becomes_space() {
        assert_eq!(spacing("え！、そう"), "え！　そう");
        assert_eq!(spacing("え？。"), "え？　");
        assert_eq!(spacing("え! そう"), "え!　そう");
    }

    #[test]
    fn closers_follow_directly() {
        assert_eq!(spacing("「何！？」"), "「何！？」");
        assert_eq!(spacing("え！　そう"), "え！　そう");
        assert_eq!(spacing("！――"), "！――");
    }

    #[test]
    fn end_of_line_untouched() {
        assert_eq!(spacing("え！\n次"), "え！\n次");
        assert_eq!(spacing("え！"), "え！");
    }
}
