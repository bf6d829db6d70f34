//! Document model for a serialized work: TOC forest, sections, content roles.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AozoraKitError, Result};

// ---------------------------------------------------------------------------
// ContentRole
// ---------------------------------------------------------------------------

/// Structural purpose of a fragment. Selects which converter passes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// Synopsis, or the body of a one-shot work.
    Story,
    /// Leaf heading.
    Subtitle,
    /// Top-level chapter heading.
    Chapter,
    /// Main text of a leaf.
    Body,
    /// Author's note before the body.
    Introduction,
    /// Author's note after the body.
    Postscript,
}

impl ContentRole {
    /// Every role, in gating-table order.
    pub const ALL: [ContentRole; 6] = [
        ContentRole::Story,
        ContentRole::Subtitle,
        ContentRole::Chapter,
        ContentRole::Body,
        ContentRole::Introduction,
        ContentRole::Postscript,
    ];

    /// The lowercase tag used in logs, config and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentRole::Story => "story",
            ContentRole::Subtitle => "subtitle",
            ContentRole::Chapter => "chapter",
            ContentRole::Body => "body",
            ContentRole::Introduction => "introduction",
            ContentRole::Postscript => "postscript",
        }
    }
}

impl std::fmt::Display for ContentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentRole {
    type Err = AozoraKitError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ContentRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AozoraKitError::InvalidContentRole { tag: s.to_string() })
    }
}

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// Depth of a TOC node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocKind {
    /// Top-level grouping node; never owns a section.
    Chapter,
    /// Leaf node; owns exactly one section.
    Subtitle,
}

/// A single node in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub kind: TocKind,
    /// Display title.
    pub title: String,
    /// Position in document order; strictly increasing in a pre-order walk.
    pub order: u32,
    /// Leaf identifier used to look up the section (e.g. `"12"`).
    pub id: String,
    /// Subtitles of a chapter. Always empty for subtitles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn chapter(order: u32, title: impl Into<String>, children: Vec<TocEntry>) -> Self {
        Self {
            kind: TocKind::Chapter,
            title: title.into(),
            order,
            id: format!("chapter-{order}"),
            children,
        }
    }

    pub fn subtitle(order: u32, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: TocKind::Subtitle,
            title: title.into(),
            order,
            id: id.into(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == TocKind::Subtitle
    }
}

/// The work's chapter/subtitle forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    pub entries: Vec<TocEntry>,
}

impl Toc {
    /// All nodes in document (pre-order) order.
    pub fn walk(&self) -> Vec<&TocEntry> {
        fn visit<'a>(entries: &'a [TocEntry], out: &mut Vec<&'a TocEntry>) {
            for entry in entries {
                out.push(entry);
                visit(&entry.children, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.entries, &mut out);
        out
    }

    /// Leaf entries in document order.
    pub fn leaves(&self) -> Vec<&TocEntry> {
        self.walk().into_iter().filter(|e| e.is_leaf()).collect()
    }

    /// Check ordering, depth and leaf-id uniqueness.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            match entry.kind {
                TocKind::Chapter => {
                    if let Some(child) = entry.children.iter().find(|c| !c.is_leaf()) {
                        return Err(AozoraKitError::validation(format!(
                            "chapter {:?} contains nested chapter {:?}",
                            entry.title, child.title
                        )));
                    }
                    if let Some(child) = entry.children.iter().find(|c| !c.children.is_empty()) {
                        return Err(AozoraKitError::validation(format!(
                            "subtitle {:?} has children",
                            child.title
                        )));
                    }
                }
                TocKind::Subtitle if !entry.children.is_empty() => {
                    return Err(AozoraKitError::validation(format!(
                        "subtitle {:?} has children",
                        entry.title
                    )));
                }
                TocKind::Subtitle => {}
            }
        }

        let mut previous: Option<u32> = None;
        let mut ids = HashSet::new();
        for entry in self.walk() {
            if let Some(prev) = previous.filter(|prev| entry.order <= *prev) {
                return Err(AozoraKitError::validation(format!(
                    "TOC order not strictly increasing: {} follows {prev} at {:?}",
                    entry.order, entry.title
                )));
            }
            previous = Some(entry.order);

            if entry.is_leaf() && !ids.insert(entry.id.as_str()) {
                return Err(AozoraKitError::validation(format!(
                    "duplicate leaf id {:?}",
                    entry.id
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// Raw markup fragments of one leaf, keyed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    /// Required for every leaf that appears in the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postscript: Option<String>,
}

impl Section {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }
}

/// Lookup from leaf identifier to its section.
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: HashMap<String, Section>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, leaf_id: impl Into<String>, section: Section) {
        self.sections.insert(leaf_id.into(), section);
    }

    pub fn get(&self, leaf_id: &str) -> Option<&Section> {
        self.sections.get(leaf_id)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl FromIterator<(String, Section)> for SectionStore {
    fn from_iter<I: IntoIterator<Item = (String, Section)>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Work
// ---------------------------------------------------------------------------

/// Whether leaf bodies are rendered as serial episodes or as a single story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkKind {
    #[default]
    Serial,
    OneShot,
}

impl WorkKind {
    /// Role for leaf bodies under this work kind.
    pub fn body_role(self) -> ContentRole {
        match self {
            WorkKind::Serial => ContentRole::Body,
            WorkKind::OneShot => ContentRole::Story,
        }
    }
}

/// Work-level metadata plus the TOC forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub title: String,
    pub author: String,
    /// Synopsis markup, converted with [`ContentRole::Story`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    /// Where the work is published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc_url: Option<String>,
    #[serde(default)]
    pub kind: WorkKind,
    pub toc: Toc,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toc() -> Toc {
        Toc {
            entries: vec![
                TocEntry::subtitle(0, "1", "プロローグ"),
                TocEntry::chapter(
                    1,
                    "第一章",
                    vec![
                        TocEntry::subtitle(2, "2", "出会い"),
                        TocEntry::subtitle(3, "3", "別れ"),
                    ],
                ),
            ],
        }
    }

    #[test]
    fn role_tags_roundtrip() {
        for role in ContentRole::ALL {
            let parsed: ContentRole = role.as_str().parse().expect("parse role");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_tag_is_rejected() {
        let err = "preface".parse::<ContentRole>().unwrap_err();
        assert!(matches!(err, AozoraKitError::InvalidContentRole { ref tag } if tag == "preface"));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ContentRole::Postscript).expect("serialize");
        assert_eq!(json, "\"postscript\"");
    }

    #[test]
    fn walk_is_preorder() {
        let toc = sample_toc();
        let titles: Vec<&str> = toc.walk().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["プロローグ", "第一章", "出会い", "別れ"]);
        assert_eq!(toc.leaves().len(), 3);
    }

    #[test]
    fn valid_toc_passes() {
        sample_toc().validate().expect("valid toc");
    }

    #[test]
    fn non_increasing_order_fails() {
        let toc = Toc {
            entries: vec![
                TocEntry::subtitle(2, "1", "a"),
                TocEntry::subtitle(2, "2", "b"),
            ],
        };
        let err = toc.validate().unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn nested_chapter_fails() {
        let toc = Toc {
            entries: vec![TocEntry::chapter(
                0,
                "第一部",
                vec![TocEntry::chapter(1, "第一章", vec![])],
            )],
        };
        assert!(toc.validate().is_err());
    }

    #[test]
    fn duplicate_leaf_id_fails() {
        let toc = Toc {
            entries: vec![
                TocEntry::subtitle(0, "1", "a"),
                TocEntry::subtitle(1, "1", "b"),
            ],
        };
        let err = toc.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate leaf id"));
    }

    #[test]
    fn one_shot_bodies_use_story_role() {
        assert_eq!(WorkKind::Serial.body_role(), ContentRole::Body);
        assert_eq!(WorkKind::OneShot.body_role(), ContentRole::Story);
    }

    #[test]
    fn work_serialization() {
        let work = Work {
            title: "テスト作品".into(),
            author: "作者".into(),
            story: Some("あらすじ".into()),
            toc_url: None,
            kind: WorkKind::Serial,
            toc: sample_toc(),
        };
        let json = serde_json::to_string(&work).expect("serialize");
        let parsed: Work = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, work);
    }
}
