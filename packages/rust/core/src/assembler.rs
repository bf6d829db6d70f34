//! Document assembler.
//!
//! Walks a work's TOC in order, routes every fragment through the converter
//! with the right role, wraps the results in Aozora heading and note blocks,
//! normalizes blank lines once over the whole buffer and writes the text file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use url::Url;

use aozorakit_converter::{Pipeline, plain_text};
use aozorakit_shared::{
    AozoraKitError, AppConfig, ContentRole, LayoutConfig, Result, Section, SectionStore, TocEntry,
    TocKind, Work,
};

use crate::blank_lines;

/// Output from a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Path of the written `.aozora.txt` file.
    pub path: PathBuf,
    /// Number of leaves rendered.
    pub leaf_count: usize,
    /// Size of the written file in bytes.
    pub bytes: usize,
}

/// Progress callback for reporting assembly status.
pub trait ProgressReporter: Send + Sync {
    /// Called before each leaf is converted.
    fn leaf_started(&self, title: &str, current: usize, total: usize);
    /// Called once the file has been written.
    fn done(&self, result: &AssembleResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn leaf_started(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &AssembleResult) {}
}

// ---------------------------------------------------------------------------
// Assembled document
// ---------------------------------------------------------------------------

/// Append-only buffer of rendered lines, finalized exactly once.
#[derive(Debug, Default)]
pub struct AssembledDocument {
    lines: Vec<String>,
}

impl AssembledDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn push_blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Normalize blank lines and end the text with exactly one newline.
    pub fn finalize(self, layout: &LayoutConfig) -> String {
        let normalized = blank_lines::normalize(&self.lines.join("\n"), layout);
        format!("{}\n", normalized.trim_end())
    }
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

const SEPARATOR: &str = "［＃区切り線］";
const PAGE_BREAK: &str = "［＃改ページ］";
const CENTERED_PAGE: &str = "［＃ページの左右中央］";
const INTRODUCTION_START: &str = "［＃ここから前書き］";
const INTRODUCTION_END: &str = "［＃ここで前書き終わり］";
const POSTSCRIPT_START: &str = "［＃ここから後書き］";
const POSTSCRIPT_END: &str = "［＃ここで後書き終わり］";
const NCODE_HOST: &str = "ncode.syosetu.com";
const NOVEL18_HOST: &str = "novel18.syosetu.com";
const END_OF_BOOK: &str =
    "［＃ここから地付き］［＃小書き］（本を読み終わりました）［＃小書き終わり］［＃ここで地付き終わり］";

fn running_head(title: &str) -> String {
    format!("［＃ここから柱］{title}［＃ここで柱終わり］")
}

fn chapter_heading(title: &str) -> String {
    format!("［＃３字下げ］［＃大見出し］{title}［＃大見出し終わり］")
}

fn subtitle_heading(title: &str) -> String {
    format!("［＃３字下げ］［＃中見出し］{title}［＃中見出し終わり］")
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Renders works into Aozora-formatted text.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    pipeline: Pipeline,
    layout: LayoutConfig,
}

impl Assembler {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config.converter.clone()),
            layout: config.layout.clone(),
        }
    }

    /// Render a work to its final text without touching the filesystem.
    #[instrument(skip_all, fields(title = %work.title))]
    pub fn render(
        &self,
        work: &Work,
        sections: &SectionStore,
        progress: &dyn ProgressReporter,
    ) -> Result<String> {
        work.toc.validate()?;
        check_sections(work, sections)?;

        let title = plain_text(&work.title);
        let total = work.toc.leaves().len();
        let mut doc = AssembledDocument::new();
        let mut current = 0;

        self.front_matter(work, &title, &mut doc);

        for entry in &work.toc.entries {
            match entry.kind {
                TocKind::Chapter => {
                    self.chapter(entry, &title, &mut doc);
                    for leaf in &entry.children {
                        current += 1;
                        progress.leaf_started(&leaf.title, current, total);
                        self.leaf(work, leaf, sections, &mut doc)?;
                    }
                }
                TocKind::Subtitle => {
                    current += 1;
                    progress.leaf_started(&entry.title, current, total);
                    self.leaf(work, entry, sections, &mut doc)?;
                }
            }
        }

        if self.layout.end_of_book_marker {
            doc.push_blank();
            doc.push(END_OF_BOOK);
        }

        debug!(lines = doc.len(), leaves = total, "document rendered");
        Ok(doc.finalize(&self.layout))
    }

    /// Render a work and write it to `<output_dir>/<safe title>.aozora.txt`.
    #[instrument(skip_all, fields(title = %work.title, output_dir = %output_dir.display()))]
    pub fn assemble(
        &self,
        work: &Work,
        sections: &SectionStore,
        output_dir: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<AssembleResult> {
        let text = self.render(work, sections, progress)?;

        std::fs::create_dir_all(output_dir).map_err(|e| AozoraKitError::io(output_dir, e))?;
        let filename = format!("{}.aozora.txt", safe_filename(&plain_text(&work.title)));
        let path = output_dir.join(&filename);
        write_atomic(output_dir, &filename, &text)?;

        let result = AssembleResult {
            path,
            leaf_count: work.toc.leaves().len(),
            bytes: text.len(),
        };

        info!(
            path = %result.path.display(),
            leaves = result.leaf_count,
            bytes = result.bytes,
            "assembly complete"
        );
        progress.done(&result);

        Ok(result)
    }

    fn front_matter(&self, work: &Work, title: &str, doc: &mut AssembledDocument) {
        doc.push(title);
        doc.push(plain_text(&work.author));
        doc.push(SEPARATOR);

        if let Some(story) = &work.story {
            let story = self.pipeline.convert(story, ContentRole::Story);
            if !story.is_empty() {
                doc.push("あらすじ：");
                doc.push(story);
                doc.push_blank();
            }
        }

        if let Some(url) = work.toc_url.as_deref().and_then(publication_url) {
            doc.push("掲載ページ:");
            doc.push(format!("<a href=\"{url}\">{url}</a>"));
        }

        doc.push(SEPARATOR);
        doc.push_blank();
    }

    fn chapter(&self, entry: &TocEntry, work_title: &str, doc: &mut AssembledDocument) {
        let heading = self.pipeline.convert(&entry.title, ContentRole::Chapter);
        doc.push(PAGE_BREAK);
        doc.push(CENTERED_PAGE);
        doc.push(running_head(work_title));
        doc.push(chapter_heading(&heading));
    }

    fn leaf(
        &self,
        work: &Work,
        entry: &TocEntry,
        sections: &SectionStore,
        doc: &mut AssembledDocument,
    ) -> Result<()> {
        let section = lookup(entry, sections)?;
        let convert = |fragment: &Option<String>, role: ContentRole| {
            fragment
                .as_deref()
                .map(|f| self.pipeline.convert(f, role))
                .unwrap_or_default()
        };

        let subtitle = self.pipeline.convert(&entry.title, ContentRole::Subtitle);
        let introduction = convert(&section.introduction, ContentRole::Introduction);
        let body = convert(&section.body, work.kind.body_role());
        let postscript = convert(&section.postscript, ContentRole::Postscript);

        doc.push(PAGE_BREAK);
        doc.push_blank();

        if !subtitle.is_empty() {
            doc.push(subtitle_heading(&subtitle));
            if introduction.is_empty() {
                doc.push_blank();
                doc.push_blank();
            }
        }

        if !introduction.is_empty() {
            doc.push(INTRODUCTION_START);
            doc.push(introduction);
            doc.push(INTRODUCTION_END);
            doc.push_blank();
            doc.push_blank();
        }

        if !body.is_empty() {
            doc.push(body);
        }

        if !postscript.is_empty() {
            doc.push(POSTSCRIPT_START);
            doc.push(postscript);
            doc.push(POSTSCRIPT_END);
        }

        debug!(leaf = %entry.id, title = %entry.title, "leaf rendered");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Every leaf must have a section with a body.
fn check_sections(work: &Work, sections: &SectionStore) -> Result<()> {
    for leaf in work.toc.leaves() {
        lookup(leaf, sections)?;
    }
    Ok(())
}

fn lookup<'a>(entry: &TocEntry, sections: &'a SectionStore) -> Result<&'a Section> {
    sections
        .get(&entry.id)
        .filter(|section| section.body.is_some())
        .ok_or_else(|| AozoraKitError::missing_section(&entry.id, &entry.title))
}

/// The publication URL, when it is an absolute http(s) URL.
///
/// Works listed on `ncode.syosetu.com` are linked through the novel18 host,
/// which serves both general and age-restricted works.
fn publication_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if url.host_str() == Some(NCODE_HOST) && url.port().is_none() {
        return Some(format!("https://{NOVEL18_HOST}{}", url.path()));
    }
    Some(raw.to_string())
}

/// File-system safe version of a title. Empty titles become `book`.
pub fn safe_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();
    let cleaned = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        "book".to_string()
    } else {
        cleaned
    }
}

/// Write to a temp file in the same directory, then rename into place.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> Result<()> {
    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| AozoraKitError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| AozoraKitError::io(&target, e))?;

    debug!(path = %target.display(), size = content.len(), "wrote file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
