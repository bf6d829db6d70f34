//! Pass 1: markup → plain text with Aozora annotations.
//!
//! Synopsis text with no `<` or `>` is treated as preformatted and keeps its
//! raw line breaks. Everything else loses raw newlines; breaks come from
//! `<br>` and paragraph ends instead.

use scraper::{ElementRef, Html, Node};

use aozorakit_shared::{ContentRole, MalformedMarkupWarning};

use crate::PassContext;

const PASS: &str = "extract";
const PAGE_BREAK_NOTE: &str = "【改ページ】";

pub(crate) fn run(text: &str, cx: &PassContext<'_>) -> String {
    let keep_newlines = is_preformatted(text, cx.role);
    let doc = Html::parse_fragment(text);

    if !doc.errors.is_empty() {
        MalformedMarkupWarning::new(
            PASS,
            format!("{} parse error(s), e.g. {}", doc.errors.len(), doc.errors[0]),
        )
        .emit();
    }

    let mut out = String::with_capacity(text.len());
    let walker = Walker { keep_newlines };
    walker.children(doc.root_element(), &mut out);
    out.replace(PAGE_BREAK_NOTE, "")
}

fn is_preformatted(text: &str, role: ContentRole) -> bool {
    role == ContentRole::Story && !text.contains(['<', '>'])
}

struct Walker {
    keep_newlines: bool,
}

impl Walker {
    fn children(&self, el: ElementRef<'_>, out: &mut String) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.text(text, out),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn text(&self, text: &str, out: &mut String) {
        if self.keep_newlines {
            out.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        } else {
            out.extend(text.chars().filter(|c| *c != '\r' && *c != '\n'));
        }
    }

    fn element(&self, el: ElementRef<'_>, out: &mut String) {
        let name = el.value().name();

        if is_tcy(el) {
            let mut inner = String::new();
            self.children(el, &mut inner);
            out.push_str(&super::tcy(&inner));
            return;
        }

        match name {
            "br" | "kbr" | "pbr" => out.push('\n'),
            "p" => {
                let start = out.len();
                self.children(el, out);
                if !(out.len() > start && out.ends_with('\n')) {
                    out.push('\n');
                }
            }
            "ruby" => self.ruby(el, out),
            "b" => self.wrap(el, "太字", out),
            "i" => self.wrap(el, "斜体", out),
            "s" => self.wrap(el, "取消線", out),
            "em" if el.value().classes().any(|c| c == "emphasisDots") => {
                self.wrap(el, "傍点", out);
            }
            "img" => match el.value().attr("src") {
                Some(src) => out.push_str(&format!("［＃挿絵（{src}）入る］")),
                None => MalformedMarkupWarning::new(PASS, "<img> without src dropped").emit(),
            },
            "script" | "style" => {}
            _ => self.children(el, out),
        }
    }

    fn wrap(&self, el: ElementRef<'_>, note: &str, out: &mut String) {
        out.push_str(&format!("［＃{note}］"));
        self.children(el, out);
        out.push_str(&format!("［＃{note}終わり］"));
    }

    fn ruby(&self, el: ElementRef<'_>, out: &mut String) {
        let mut base = String::new();
        let mut reading = String::new();
        let mut has_rt = false;

        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.text(text, &mut base),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    match child.value().name() {
                        "rt" => {
                            has_rt = true;
                            reading.extend(child.text());
                        }
                        "rp" => {}
                        _ => self.element(child, &mut base),
                    }
                }
                _ => {}
            }
        }

        let reading = reading.trim();
        if !has_rt || reading.is_empty() {
            MalformedMarkupWarning::new(PASS, format!("<ruby> without reading: {base}")).emit();
            out.push_str(&base);
        } else if reading.chars().all(|c| c == '・' || c == '、') {
            out.push_str(&format!("［＃傍点］{base}［＃傍点終わり］"));
        } else {
            out.push_str(&format!("｜{base}《{reading}》"));
        }
    }
}

fn is_tcy(el: ElementRef<'_>) -> bool {
    el.value().classes().any(|c| c == "tcy")
        || el
            .value()
            .attr("style")
            .is_some_and(|style| style.contains("text-combine-upright"))
}
