//! Error types for AozoraKit.
//!
//! Library crates use [`AozoraKitError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::PathBuf;

/// Top-level error type for all AozoraKit operations.
#[derive(Debug, thiserror::Error)]
pub enum AozoraKitError {
    /// A leaf TOC entry has no section providing its body.
    #[error("missing section for leaf {leaf_id:?} ({title}): no body fragment")]
    MissingSection { leaf_id: String, title: String },

    /// An unrecognized content-role tag reached the gating table.
    #[error("invalid content role tag: {tag:?}")]
    InvalidContentRole { tag: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Archive JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document model validation error (TOC ordering, depth, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AozoraKitError>;

impl AozoraKitError {
    /// Create a missing-section error for a leaf.
    pub fn missing_section(leaf_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::MissingSection {
            leaf_id: leaf_id.into(),
            title: title.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Non-fatal diagnostics
// ---------------------------------------------------------------------------

/// A span a pass could not rewrite with confidence.
///
/// Never returned as an error: the span is left as it was and the warning is
/// logged so the fragment can continue through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMarkupWarning {
    /// Name of the pass that gave up on the span.
    pub pass: &'static str,
    /// What was wrong, including a short excerpt of the span.
    pub detail: String,
}

impl MalformedMarkupWarning {
    pub fn new(pass: &'static str, detail: impl Into<String>) -> Self {
        Self {
            pass,
            detail: detail.into(),
        }
    }

    /// Log the warning through `tracing`.
    pub fn emit(&self) {
        tracing::warn!(pass = self.pass, detail = %self.detail, "malformed markup left unchanged");
    }
}

impl fmt::Display for MalformedMarkupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed markup in {} pass: {}", self.pass, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AozoraKitError::config("bad threshold");
        assert_eq!(err.to_string(), "config error: bad threshold");

        let err = AozoraKitError::missing_section("12", "第十二話");
        assert!(err.to_string().contains("\"12\""));
        assert!(err.to_string().contains("第十二話"));
    }

    #[test]
    fn invalid_role_names_the_tag() {
        let err = AozoraKitError::InvalidContentRole {
            tag: "preface".into(),
        };
        assert_eq!(err.to_string(), "invalid content role tag: \"preface\"");
    }

    #[test]
    fn warning_display_includes_pass() {
        let warning = MalformedMarkupWarning::new("extract", "<ruby> without <rt>: 漢字");
        assert_eq!(
            warning.to_string(),
            "malformed markup in extract pass: <ruby> without <rt>: 漢字"
        );
    }
}
