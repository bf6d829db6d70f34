//! Protected spans.
//!
//! URLs, English runs and directives emitted by extraction are swapped for
//! private-use sentinels so that the character-level passes leave them alone.
//! A sentinel is `OPEN`, one index character, `CLOSE`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use aozorakit_shared::MalformedMarkupWarning;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';
const INDEX_BASE: u32 = 0xE100;
const INDEX_LAST: u32 = 0xF8FF;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"［＃縦中横］.*?［＃縦中横終わり］|［＃挿絵（[^）]*）入る］").expect("valid regex")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+").expect("valid regex")
});

static ENGLISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[A-Za-z0-9_.,!?"' &:;-]+"#).expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Directive,
    Url,
    English,
}

#[derive(Debug, Clone)]
struct Span {
    kind: SpanKind,
    text: String,
}

/// Spans taken out of a fragment, restorable by index.
#[derive(Debug, Clone, Default)]
pub(crate) struct Shelter {
    spans: Vec<Span>,
}

impl Shelter {
    /// Replace every protectable span with a sentinel.
    pub(crate) fn protect(text: &str) -> (String, Shelter) {
        let mut shelter = Shelter::default();
        let text = shelter.stash(text, &DIRECTIVE, SpanKind::Directive, |_| true);
        let text = shelter.stash(&text, &URL, SpanKind::Url, |_| true);
        let text = shelter.stash(&text, &ENGLISH, SpanKind::English, is_english);
        (text, shelter)
    }

    /// Put every span back. URLs become `<a href>` links when `link_urls` is set.
    pub(crate) fn restore(&self, text: &str, link_urls: bool) -> String {
        if self.spans.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != OPEN {
                out.push(c);
                continue;
            }

            let span = chars
                .peek()
                .and_then(|idx| (*idx as u32).checked_sub(INDEX_BASE))
                .and_then(|idx| self.spans.get(idx as usize));

            match span {
                Some(span) => {
                    chars.next();
                    if chars.peek() == Some(&CLOSE) {
                        chars.next();
                    }
                    match span.kind {
                        SpanKind::Url if link_urls => {
                            out.push_str(&format!("<a href=\"{0}\">{0}</a>", span.text));
                        }
                        _ => out.push_str(&span.text),
                    }
                }
                None => out.push(c),
            }
        }
        out
    }

    fn stash(
        &mut self,
        text: &str,
        re: &Regex,
        kind: SpanKind,
        accept: impl Fn(&str) -> bool,
    ) -> String {
        re.replace_all(text, |caps: &Captures<'_>| {
            let span = &caps[0];
            if !accept(span) {
                return span.to_string();
            }
            match self.push(kind, span) {
                Some(sentinel) => sentinel,
                None => {
                    MalformedMarkupWarning::new(
                        "shelter",
                        format!("too many protected spans, leaving {span:?} exposed"),
                    )
                    .emit();
                    span.to_string()
                }
            }
        })
        .into_owned()
    }

    fn push(&mut self, kind: SpanKind, text: &str) -> Option<String> {
        let code = INDEX_BASE + u32::try_from(self.spans.len()).ok()?;
        if code > INDEX_LAST {
            return None;
        }
        let index = char::from_u32(code)?;
        self.spans.push(Span {
            kind,
            text: text.to_string(),
        });
        Some(format!("{OPEN}{index}{CLOSE}"))
    }
}

/// Sentence-like (two or more words) or a long word with at least one letter.
fn is_english(token: &str) -> bool {
    let words = token.split(' ').filter(|chunk| !chunk.is_empty()).count();
    let long_word =
        token.chars().count() >= 8 && token.chars().any(|c| c.is_ascii_alphabetic());
    words >= 2 || long_word
}
