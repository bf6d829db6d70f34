//! Fragment converter: raw section markup → Aozora Bunko formatted text.
//!
//! A fragment runs through an ordered table of named passes ([`pass::PASSES`]).
//! Which passes run, and how the result is finished, depends on the fragment's
//! [`ContentRole`] and is looked up in [`gating::GATING_TABLE`].
//!
//! Passes 2–9 never see URLs, English text or directives produced by the
//! extraction pass: those spans are swapped for sentinels before the first of
//! them runs and restored after the last one (see `shelter`).

pub mod gating;
pub mod pass;

mod finish;
mod passes;
mod shelter;

use tracing::{debug, instrument};

use aozorakit_shared::{ContentRole, ConverterConfig, Result};

use crate::gating::{Finish, PassMode};
use crate::pass::{PASSES, PassId};
use crate::shelter::Shelter;

pub use crate::passes::numerals::NUMERAL_EXCEPTIONS;

/// What a pass can see besides the text itself.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub role: ContentRole,
    pub config: &'a ConverterConfig,
}

/// The converter pipeline, configured once and reused for every fragment.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: ConverterConfig,
}

impl Pipeline {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Convert one fragment.
    #[instrument(level = "debug", skip(self, fragment), fields(role = %role, len = fragment.len()))]
    pub fn convert(&self, fragment: &str, role: ContentRole) -> String {
        self.execute(fragment, role, |_, _| {})
    }

    /// Convert one fragment whose role arrives as a string tag.
    pub fn convert_tagged(&self, fragment: &str, tag: &str) -> Result<String> {
        let gate = gating::gate_for_tag(tag)?;
        Ok(self.convert(fragment, gate.role))
    }

    /// Convert one fragment, recording the text after every pass.
    ///
    /// Snapshots taken while spans are protected contain sentinel characters.
    pub fn trace(&self, fragment: &str, role: ContentRole) -> Vec<(PassId, String)> {
        let mut steps = Vec::with_capacity(PASSES.len());
        self.execute(fragment, role, |id, text| steps.push((id, text.to_string())));
        steps
    }

    fn execute(
        &self,
        fragment: &str,
        role: ContentRole,
        mut observe: impl FnMut(PassId, &str),
    ) -> String {
        if fragment.trim().is_empty() {
            return String::new();
        }

        let gate = gating::gate_for(role);
        let cx = PassContext {
            role,
            config: &self.config,
        };

        let mut text = fragment.to_string();
        let mut shelter: Option<Shelter> = None;

        for pass in &PASSES {
            if pass.id.is_shielded() && shelter.is_none() {
                let (protected, spans) = Shelter::protect(&text);
                text = protected;
                shelter = Some(spans);
            } else if !pass.id.is_shielded() {
                if let Some(spans) = shelter.take() {
                    text = spans.restore(&text, self.config.link_urls);
                }
            }

            text = match gate.mode(pass.id) {
                PassMode::Run => (pass.run)(&text, &cx),
                PassMode::Skip => text,
                PassMode::ProseLinesOnly => self.run_on_prose_lines(pass.run, &text, &cx),
            };

            debug!(pass = pass.id.name(), len = text.len(), "pass complete");
            observe(pass.id, &text);
        }

        if let Some(spans) = shelter.take() {
            text = spans.restore(&text, self.config.link_urls);
        }

        match gate.finish {
            Finish::Prose => finish::prose(&text),
            Finish::Heading => finish::heading(&text),
        }
    }

    /// Apply a pass line by line, leaving heading-like lines untouched.
    fn run_on_prose_lines(
        &self,
        run: fn(&str, &PassContext<'_>) -> String,
        text: &str,
        cx: &PassContext<'_>,
    ) -> String {
        text.split('\n')
            .map(|line| {
                if finish::is_heading_like(line, self.config.heading_like_max_len) {
                    line.to_string()
                } else {
                    run(line, cx)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Convert one fragment with the default configuration.
pub fn convert(fragment: &str, role: ContentRole) -> String {
    Pipeline::default().convert(fragment, role)
}

/// Markup stripped to one line of text, with no glyph rewriting.
///
/// Used for metadata such as the work title and author name.
pub fn plain_text(fragment: &str) -> String {
    let config = ConverterConfig::default();
    let cx = PassContext {
        role: ContentRole::Story,
        config: &config,
    };
    finish::heading(&(PassId::Extract.pass().run)(fragment, &cx))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use aozorakit_shared::AozoraKitError;
    use proptest::prelude::*;

    fn body(text: &str) -> String {
        convert(text, ContentRole::Body)
    }

    #[test]
    fn narou_body_paragraphs() {
        let html = concat!(
            "<p id=\"L1\">　彼は<ruby>魔法<rp>(</rp><rt>まほう</rt><rp>)</rp></ruby>を使った。</p>\n",
            "<p id=\"L2\"><br /></p>\n",
            "<p id=\"L3\">「本当に!?」</p>",
        );
        assert_eq!(
            body(html),
            "　彼は｜魔法《まほう》を使った。\n\n［＃二分アキ］「本当に［＃縦中横］!?［＃縦中横終わり］」"
        );
    }

    #[test]
    fn only_plain_synopsis_keeps_raw_line_breaks() {
        assert_eq!(convert("一行目\n二行目", ContentRole::Story), "一行目\n二行目");
        assert_eq!(body("一行目\n二行目"), "一行目二行目");
        assert_eq!(
            convert("一行目\n二行目", ContentRole::Introduction),
            "一行目二行目"
        );
    }


    #[test]
    fn empty_fragment_yields_empty_text() {
        assert_eq!(body(""), "");
        assert_eq!(body("  \n "), "");
    }

    #[test]
    fn kanji_numerals_in_prose_are_left_alone() {
        assert_eq!(body("三四郎は九九を覚えた。"), "三四郎は九九を覚えた。");
        assert_eq!(body("二三か月後"), "二三か月後");
        assert_eq!(body("一二三"), "一二三");
    }

    #[test]
    fn numbers_and_tatechuyoko() {
        assert_eq!(body("第12話は3時に始まる"), "第［＃縦中横］12［＃縦中横終わり］話は３時に始まる");
        assert_eq!(body("2024年"), "２０２４年");
    }

    #[test]
    fn english_sentences_and_urls_survive() {
        let text = "彼は Hello world と言った。https://example.com/a_1 を見よ";
        assert_eq!(
            body(text),
            "彼は Hello world と言った。<a href=\"https://example.com/a_1\">https://example.com/a_1</a> を見よ"
        );
    }

    #[test]
    fn url_links_can_be_disabled() {
        let pipeline = Pipeline::new(ConverterConfig {
            link_urls: false,
            ..ConverterConfig::default()
        });
        assert_eq!(
            pipeline.convert("https://example.com/", ContentRole::Body),
            "https://example.com/"
        );
    }

    #[test]
    fn double_angle_brackets_become_gaiji() {
        assert_eq!(
            body("彼は《重要》と書いた"),
            "彼は※［＃始め二重山括弧］重要※［＃終わり二重山括弧］と書いた"
        );
        assert_eq!(
            body("《重要》"),
            "［＃二分アキ］※［＃始め二重山括弧］重要※［＃終わり二重山括弧］"
        );
    }

    #[test]
    fn explicit_narou_ruby_is_kept() {
        assert_eq!(body("|漢字《かんじ》"), "｜漢字《かんじ》");
    }

    #[test]
    fn stray_vertical_bar_becomes_rule() {
        assert_eq!(body("A|B"), "Ａ※［＃縦線］Ｂ");
    }

    #[test]
    fn kome_becomes_gaiji() {
        assert_eq!(body("※注意"), "※［＃米印、1-2-8］注意");
    }

    #[test]
    fn soft_wrapped_lines_join_in_body_only() {
        let text = "彼は走った、<br>　そして転んだ。";
        assert_eq!(body(text), "彼は走った、そして転んだ。");
        assert_eq!(convert(text, ContentRole::Subtitle), "彼は走った、　そして転んだ。");
    }

    #[test]
    fn headings_collapse_to_one_line() {
        assert_eq!(convert("  第一章\n　旅立ち  ", ContentRole::Chapter), "第一章　旅立ち");
    }

    #[test]
    fn introduction_keeps_short_lines_upright() {
        let text = "ＯＫ<br>ＯＫですか。";
        assert_eq!(
            convert(text, ContentRole::Introduction),
            "ＯＫ\n［＃縦中横］OK［＃縦中横終わり］ですか。"
        );
        assert_eq!(
            body(text),
            "［＃縦中横］OK［＃縦中横終わり］\n［＃縦中横］OK［＃縦中横終わり］ですか。"
        );
    }

    #[test]
    fn tagged_conversion_rejects_unknown_roles() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.convert_tagged("本文", "postscript").expect("known tag"),
            "本文"
        );
        let err = pipeline.convert_tagged("本文", "afterword").unwrap_err();
        assert!(matches!(err, AozoraKitError::InvalidContentRole { .. }));
    }

    #[test]
    fn plain_text_strips_markup_only() {
        assert_eq!(plain_text("<span>テスト</span>作品 &amp; 1"), "テスト作品 & 1");
        assert_eq!(plain_text("  作者A \n"), "作者A");
    }

    #[test]
    fn trace_records_every_pass_in_order() {
        let steps = Pipeline::default().trace("<p>テスト</p>", ContentRole::Body);
        let ids: Vec<PassId> = steps.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, PassId::ALL.to_vec());
        assert_eq!(steps[0].1, "テスト\n");
    }

    // --- Role-gating properties ---

    #[test]
    fn subtitle_and_body_agree_through_pass_nine() {
        let pipeline = Pipeline::default();
        let text = "<p>　「12人、」</p><p>　来た!!!</p><p>……</p>";
        let subtitle = pipeline.trace(text, ContentRole::Subtitle);
        let body = pipeline.trace(text, ContentRole::Body);
        for (a, b) in subtitle.iter().zip(&body) {
            if a.0 < PassId::LineJoin {
                assert_eq!(a, b, "diverged at {}", a.0.name());
            }
        }
        assert_ne!(subtitle.last(), body.last());
    }

    #[test]
    fn subtitle_and_body_agree_without_tail_rewrites() {
        let text = "第3話 旅立ちの日";
        assert_eq!(
            convert(text, ContentRole::Subtitle),
            convert(text, ContentRole::Body)
        );
    }

    // --- Exception table ---

    #[test]
    fn every_numeral_exception_survives_the_pipeline() {
        for idiom in NUMERAL_EXCEPTIONS {
            assert_eq!(body(idiom), *idiom, "idiom {idiom} was rewritten");
        }
    }

    // --- Idempotence ---

    proptest! {
        #[test]
        fn symbols_and_numerals_idempotent_on_canonical_text(
            text in "[あいうえお漢字本文０-９Ａ-Ｚａ-ｚ「」『』（）〝〟、。！？＃％＆＝＋－／＿；：［］｛｝〈〉≪≫￥　]{0,40}"
        ) {
            let config = ConverterConfig::default();
            let cx = PassContext { role: ContentRole::Body, config: &config };
            let once = (PassId::Symbols.pass().run)(&text, &cx);
            prop_assert_eq!(&once, &text);
            let numbers = (PassId::Numerals.pass().run)(&text, &cx);
            prop_assert_eq!(&numbers, &text);
        }
    }
}
