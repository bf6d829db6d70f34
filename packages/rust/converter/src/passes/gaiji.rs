//! Pass 8: ruby restoration and gaiji annotations.
//!
//! The symbols pass turned every `《》` into `≪≫`. Pairs that follow a `｜`
//! base are ruby and go back to `《》`; the rest are literal double angle
//! brackets and become gaiji notes, as does `※`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::map_chars;
use crate::PassContext;

static MARKED_RUBY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"｜([^｜≪≫\n]+)≪([^≪≫\n]+)≫").expect("valid regex"));

static PUNCTUATION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[…‥。．、，－,\-]+$").expect("valid regex"));

pub(crate) fn run(text: &str, _cx: &PassContext<'_>) -> String {
    let text = MARKED_RUBY.replace_all(text, |caps: &Captures<'_>| {
        if PUNCTUATION_ONLY.is_match(&caps[2]) {
            caps[0].to_string()
        } else {
            format!("｜{}《{}》", &caps[1], &caps[2])
        }
    });

    map_chars(&text, |c| match c {
        '≪' => Some("※［＃始め二重山括弧］"),
        '≫' => Some("※［＃終わり二重山括弧］"),
        '※' => Some("※［＃米印、1-2-8］"),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use aozorakit_shared::{ContentRole, ConverterConfig};

    fn gaiji(text: &str) -> String {
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
    fn marked_ruby_restored() {
        assert_eq!(gaiji("｜魔法≪まほう≫だ"), "｜魔法《まほう》だ");
    }

    #[test]
    fn punctuation_reading_is_not_ruby() {
        assert_eq!(
            gaiji("｜待って≪……≫"),
            "｜待って※［＃始め二重山括弧］……※［＃終わり二重山括弧］"
        );
    }

    #[test]
    fn unmarked_brackets_become_gaiji() {
        assert_eq!(
            gaiji("≪技≫"),
            "※［＃始め二重山括弧］技※［＃終わり二重山括弧］"
        );
    }

    #[test]
    fn kome_is_annotated_once() {
        assert_eq!(gaiji("※注"), "※［＃米印、1-2-8］注");
    }
}
