//! Core orchestration for AozoraKit.
//!
//! This crate ties together archive loading, TOC building, fragment
//! conversion and document assembly into the end-to-end `convert_archive`
//! workflow.

pub mod archive;
pub mod assembler;
pub mod blank_lines;
pub mod toc;

use std::path::Path;

use tracing::instrument;

use aozorakit_shared::{AppConfig, Result};

use crate::assembler::{AssembleResult, Assembler, ProgressReporter};

/// Load a novel archive directory and write its Aozora text into `output_dir`.
#[instrument(skip(config, progress), fields(dir = %dir.display()))]
pub fn convert_archive(
    dir: &Path,
    output_dir: &Path,
    config: &AppConfig,
    progress: &dyn ProgressReporter,
) -> Result<AssembleResult> {
    config.validate()?;
    let archive = archive::load_archive(dir)?;
    Assembler::new(config).assemble(&archive.work, &archive.sections, output_dir, progress)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
