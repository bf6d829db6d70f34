//! Pass 11: half-width indent for lines opening with a bracket.

use std::sync::LazyLock;

use regex::Regex;

use crate::PassContext;

static OPENING_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ 　\t]*([〔「『(（【〈《≪〝]|※［＃始め二重山括弧］)").expect("valid regex")
});

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    OPENING_BRACKET
        .replace_all(text, "［＃二分アキ］${1}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use aozorakit_shared::{ContentRole, ConverterConfig};

    fn bracket_indent(text: &str) -> String {
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
    fn indent_replaced_by_half_space() {
        assert_eq!(bracket_indent("　「はい」"), "［＃二分アキ］「はい」");
        assert_eq!(bracket_indent("『本』"), "［＃二分アキ］『本』");
        assert_eq!(
            bracket_indent("※［＃始め二重山括弧］技"),
            "［＃二分アキ］※［＃始め二重山括弧］技"
        );
    }

    #[test]
    fn only_line_starts() {
        assert_eq!(
            bracket_indent("地の文「台詞」\n　（注）"),
            "地の文「台詞」\n［＃二分アキ］（注）"
        );
        assert_eq!(bracket_indent("　本文"), "　本文");
    }
}
