//! TOC builder.
//!
//! Turns the flat, ordered subtitle list of an archive into the two-level
//! chapter/subtitle forest. Consecutive subtitles that share a chapter name
//! are grouped under one chapter node; subtitles without a chapter stay at the
//! top level.

use tracing::{debug, instrument};

use aozorakit_shared::{Toc, TocEntry};

/// One leaf as listed by the archive, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLeaf {
    /// Section key.
    pub id: String,
    pub title: String,
    /// Chapter this leaf opens or continues; empty when none.
    pub chapter: String,
}

impl TocLeaf {
    pub fn new(id: impl Into<String>, title: impl Into<String>, chapter: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            chapter: chapter.into(),
        }
    }
}

/// Build the forest. Orders are assigned sequentially in pre-order.
///
/// A new chapter node starts whenever a leaf names a chapter different from
/// the current one. A leaf with an empty chapter name continues the current
/// chapter, matching archives that only tag the first episode of a chapter.
#[instrument(skip_all, fields(leaves = leaves.len()))]
pub fn build_toc(leaves: &[TocLeaf]) -> Toc {
    let mut entries: Vec<TocEntry> = Vec::new();
    let mut current_chapter: Option<String> = None;
    let mut order: u32 = 0;

    for leaf in leaves {
        let chapter = leaf.chapter.trim();
        if !chapter.is_empty() && current_chapter.as_deref() != Some(chapter) {
            entries.push(TocEntry::chapter(order, chapter, Vec::new()));
            order += 1;
            current_chapter = Some(chapter.to_string());
        }

        let entry = TocEntry::subtitle(order, leaf.id.clone(), leaf.title.clone());
        order += 1;

        match entries.last_mut() {
            Some(parent) if current_chapter.is_some() && !parent.is_leaf() => {
                parent.children.push(entry);
            }
            _ => entries.push(entry),
        }
    }

    debug!(
        top_level = entries.len(),
        chapters = entries.iter().filter(|e| !e.is_leaf()).count(),
        "TOC built"
    );

    Toc { entries }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
