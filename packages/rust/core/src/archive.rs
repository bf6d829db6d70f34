//! Novel archive loader.
//!
//! An archive directory holds `toc.json` and one JSON file per episode under
//! `本文/`:
//! ```text
//! <novel_dir>/
//! ├── toc.json          { title, author, toc_url, story, subtitles[] }
//! └── 本文/
//!     ├── 1 第一話.json  { index, subtitle, chapter, element { introduction, body, postscript } }
//!     └── ...
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::{debug, info, instrument, warn};

use aozorakit_shared::{AozoraKitError, Result, Section, SectionStore, Work, WorkKind};

use crate::toc::{TocLeaf, build_toc};

/// Directory holding the per-episode files.
pub const SECTION_DIR_NAME: &str = "本文";

/// Table-of-contents file name.
pub const TOC_FILE_NAME: &str = "toc.json";

/// `novel_type` value marking a one-shot work.
const NOVEL_TYPE_ONE_SHOT: u8 = 2;

/// A loaded archive: work metadata plus the raw section fragments.
#[derive(Debug, Clone)]
pub struct Archive {
    pub work: Work,
    pub sections: SectionStore,
}

// ---------------------------------------------------------------------------
// On-disk schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TocFile {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    toc_url: Option<String>,
    #[serde(default)]
    story: Option<String>,
    #[serde(default)]
    novel_type: Option<u8>,
    #[serde(default)]
    subtitles: Vec<TocSubtitle>,
}

#[derive(Debug, Deserialize)]
struct TocSubtitle {
    #[serde(deserialize_with = "string_or_number")]
    index: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    chapter: String,
}

#[derive(Debug, Deserialize)]
struct SectionFile {
    #[serde(default, deserialize_with = "string_or_number")]
    index: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    chapter: String,
    #[serde(default)]
    element: SectionElement,
}

#[derive(Debug, Default, Deserialize)]
struct SectionElement {
    #[serde(default)]
    introduction: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    postscript: Option<String>,
}

/// Accept `"12"` as well as `12`.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an archive directory into a [`Work`] and its [`SectionStore`].
///
/// The TOC comes from `toc.json`'s `subtitles`; when that list is empty, the
/// section files themselves (in index order) define it. A subtitle's chapter
/// falls back to the chapter recorded in its section file.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_archive(dir: &Path) -> Result<Archive> {
    let toc_path = dir.join(TOC_FILE_NAME);
    let toc: TocFile = read_json(&toc_path)?;

    let files = load_section_files(&dir.join(SECTION_DIR_NAME))?;
    let leaves = toc_leaves(&toc.subtitles, &files);

    let kind = match toc.novel_type {
        Some(NOVEL_TYPE_ONE_SHOT) => WorkKind::OneShot,
        _ => WorkKind::Serial,
    };

    let sections: SectionStore = files
        .into_iter()
        .map(|file| {
            let section = Section {
                introduction: file.element.introduction,
                body: file.element.body,
                postscript: file.element.postscript,
            };
            (file.index, section)
        })
        .collect();

    let work = Work {
        title: toc.title,
        author: toc.author,
        story: toc.story.filter(|s| !s.trim().is_empty()),
        toc_url: toc.toc_url.filter(|s| !s.trim().is_empty()),
        kind,
        toc: build_toc(&leaves),
    };

    info!(
        title = %work.title,
        leaves = leaves.len(),
        sections = sections.len(),
        "archive loaded"
    );

    Ok(Archive { work, sections })
}

/// Leaves in document order, filling gaps from the section files.
fn toc_leaves(subtitles: &[TocSubtitle], files: &[SectionFile]) -> Vec<TocLeaf> {
    if subtitles.is_empty() {
        debug!("toc.json lists no subtitles, using section files");
        return files
            .iter()
            .map(|file| TocLeaf::new(&file.index, &file.subtitle, &file.chapter))
            .collect();
    }

    let by_index: HashMap<&str, &SectionFile> =
        files.iter().map(|file| (file.index.as_str(), file)).collect();

    subtitles
        .iter()
        .map(|sub| {
            let file = by_index.get(sub.index.as_str());
            let title = if sub.subtitle.is_empty() {
                file.map(|f| f.subtitle.clone()).unwrap_or_default()
            } else {
                sub.subtitle.clone()
            };
            let chapter = if sub.chapter.trim().is_empty() {
                file.map(|f| f.chapter.clone()).unwrap_or_default()
            } else {
                sub.chapter.clone()
            };
            TocLeaf::new(&sub.index, title, chapter)
        })
        .collect()
}

/// Read every `*.json` under the section directory, sorted by leading index.
fn load_section_files(section_dir: &Path) -> Result<Vec<SectionFile>> {
    let entries =
        std::fs::read_dir(section_dir).map_err(|e| AozoraKitError::io(section_dir, e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AozoraKitError::io(section_dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort_by_key(|path| section_sort_key(path));

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let mut file: SectionFile = read_json(&path)?;
        if file.index.is_empty() {
            file.index = file_index(&path).unwrap_or_default();
        }
        if file.index.is_empty() {
            warn!(path = %path.display(), "section file has no index, skipped");
            continue;
        }
        files.push(file);
    }

    debug!(count = files.len(), "section files read");
    Ok(files)
}

/// Leading whitespace-delimited token of the file stem.
fn file_index(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let index = stem.split(' ').next()?.trim();
    (!index.is_empty()).then(|| index.to_string())
}

/// Numeric index first, then the stem; non-numeric names sort last.
fn section_sort_key(path: &Path) -> (u64, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let index = file_index(path)
        .and_then(|i| i.parse::<u64>().ok())
        .unwrap_or(u64::MAX);
    (index, stem)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| AozoraKitError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| AozoraKitError::parse(format!("invalid {}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("aozorakit-archive-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(dir.join(SECTION_DIR_NAME)).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, json: serde_json::Value) {
        std::fs::write(dir.join(name), serde_json::to_string_pretty(&json).unwrap()).unwrap();
    }

    fn make_archive() -> PathBuf {
        let dir = temp_dir();
        write(
            &dir,
            TOC_FILE_NAME,
            serde_json::json!({
                "title": "テスト作品",
                "author": "作者A",
                "toc_url": "https://ncode.syosetu.com/n0001aa/",
                "story": "これは<br>あらすじ",
                "subtitles": [
                    { "index": "1", "subtitle": "第一話" },
                    { "index": 2, "subtitle": "第二話", "chapter": "" },
                    { "index": "10", "subtitle": "第十話", "chapter": "第二章" }
                ]
            }),
        );
        let sections = dir.join(SECTION_DIR_NAME);
        write(
            &sections,
            "1 第一話.json",
            serde_json::json!({
                "index": "1",
                "subtitle": "第一話",
                "chapter": "第一章",
                "element": { "introduction": "前書き", "body": "本文", "postscript": "後書き" }
            }),
        );
        write(
            &sections,
            "2 第二話.json",
            serde_json::json!({
                "subtitle": "第二話",
                "element": { "body": "本文二" }
            }),
        );
        write(
            &sections,
            "10 第十話.json",
            serde_json::json!({
                "index": "10",
                "element": { "introduction": "" }
            }),
        );
        dir
    }

    #[test]
    fn loads_work_metadata() {
        let dir = make_archive();
        let archive = load_archive(&dir).unwrap();

        assert_eq!(archive.work.title, "テスト作品");
        assert_eq!(archive.work.author, "作者A");
        assert_eq!(archive.work.story.as_deref(), Some("これは<br>あらすじ"));
        assert_eq!(archive.work.kind, WorkKind::Serial);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn chapters_fall_back_to_section_files() {
        let dir = make_archive();
        let archive = load_archive(&dir).unwrap();

        let toc = &archive.work.toc;
        toc.validate().unwrap();
        assert_eq!(toc.entries.len(), 2);
        assert_eq!(toc.entries[0].title, "第一章");
        assert_eq!(toc.entries[0].children.len(), 2);
        assert_eq!(toc.entries[1].title, "第二章");
        assert_eq!(toc.entries[1].children[0].id, "10");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sections_are_keyed_by_index_or_file_name() {
        let dir = make_archive();
        let archive = load_archive(&dir).unwrap();

        assert_eq!(archive.sections.len(), 3);
        let first = archive.sections.get("1").unwrap();
        assert_eq!(first.introduction.as_deref(), Some("前書き"));
        assert_eq!(first.postscript.as_deref(), Some("後書き"));
        assert_eq!(archive.sections.get("2").unwrap().body.as_deref(), Some("本文二"));
        assert!(archive.sections.get("10").unwrap().body.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_subtitle_list_uses_section_order() {
        let dir = make_archive();
        write(
            &dir,
            TOC_FILE_NAME,
            serde_json::json!({ "title": "短編", "author": "B", "novel_type": 2 }),
        );
        let archive = load_archive(&dir).unwrap();

        let ids: Vec<&str> = archive
            .work
            .toc
            .leaves()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2", "10"]);
        assert_eq!(archive.work.kind, WorkKind::OneShot);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_toc_is_io_error() {
        let dir = temp_dir();
        let err = load_archive(&dir).unwrap_err();
        assert!(matches!(err, AozoraKitError::Io { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = temp_dir();
        std::fs::write(dir.join(TOC_FILE_NAME), "{ not json").unwrap();
        let err = load_archive(&dir).unwrap_err();
        assert!(matches!(err, AozoraKitError::Parse { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sort_key_orders_numerically() {
        let mut paths = vec![
            PathBuf::from("10 c.json"),
            PathBuf::from("2 b.json"),
            PathBuf::from("notes.json"),
            PathBuf::from("1 a.json"),
        ];
        paths.sort_by_key(|p| section_sort_key(p));
        assert_eq!(
            paths,
            [
                PathBuf::from("1 a.json"),
                PathBuf::from("2 b.json"),
                PathBuf::from("10 c.json"),
                PathBuf::from("notes.json"),
            ]
        );
    }
}
