//! Shared types, error model, and configuration for AozoraKit.
//!
//! This crate is the foundation depended on by all other AozoraKit crates.
//! It provides:
//! - [`AozoraKitError`], the unified error type
//! - Document model types ([`Work`], [`Toc`], [`TocEntry`], [`Section`], [`ContentRole`])
//! - Configuration ([`AppConfig`], [`ConverterConfig`], [`LayoutConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConverterConfig, LayoutConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{AozoraKitError, MalformedMarkupWarning, Result};
pub use types::{ContentRole, Section, SectionStore, Toc, TocEntry, TocKind, Work, WorkKind};
