//! Application configuration for AozoraKit.
//!
//! User config lives at `~/.aozorakit/aozorakit.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! The defaults are calibrated against the reference fixtures; changing them
//! changes the output of every work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AozoraKitError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "aozorakit.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".aozorakit";

// ---------------------------------------------------------------------------
// Config structs (matching aozorakit.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Per-fragment converter settings.
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Whole-document layout settings.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// `[converter]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Longest alphanumeric run set sideways in vertical text.
    #[serde(default = "default_tatechuyoko_max_len")]
    pub tatechuyoko_max_len: usize,

    /// Lines up to this many characters count as heading-like in
    /// introductions and postscripts.
    #[serde(default = "default_heading_like_max_len")]
    pub heading_like_max_len: usize,

    /// Restore protected URLs as `<a href>` links.
    #[serde(default = "default_true")]
    pub link_urls: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            tatechuyoko_max_len: default_tatechuyoko_max_len(),
            heading_like_max_len: default_heading_like_max_len(),
            link_urls: true,
        }
    }
}

fn default_tatechuyoko_max_len() -> usize {
    2
}
fn default_heading_like_max_len() -> usize {
    10
}
fn default_true() -> bool {
    true
}

/// `[layout]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Blank lines kept for any run of blank lines.
    #[serde(default = "default_blank_lines_max")]
    pub blank_lines_max: usize,

    /// Blank lines kept right after a chapter heading.
    #[serde(default = "default_blank_lines_after_chapter")]
    pub blank_lines_after_chapter: usize,

    /// Append the "finished reading" marker at the end of the book.
    #[serde(default = "default_true")]
    pub end_of_book_marker: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            blank_lines_max: default_blank_lines_max(),
            blank_lines_after_chapter: default_blank_lines_after_chapter(),
            end_of_book_marker: true,
        }
    }
}

fn default_blank_lines_max() -> usize {
    1
}
fn default_blank_lines_after_chapter() -> usize {
    2
}

impl AppConfig {
    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.converter.tatechuyoko_max_len < 2 {
            return Err(AozoraKitError::config(format!(
                "converter.tatechuyoko_max_len must be at least 2 (got {})",
                self.converter.tatechuyoko_max_len
            )));
        }
        if self.layout.blank_lines_max == 0 {
            return Err(AozoraKitError::config(
                "layout.blank_lines_max must be at least 1",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.aozorakit/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AozoraKitError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.aozorakit/aozorakit.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AozoraKitError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        AozoraKitError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AozoraKitError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AozoraKitError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AozoraKitError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("tatechuyoko_max_len = 2"));
        assert!(toml_str.contains("blank_lines_after_chapter = 2"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[converter]
tatechuyoko_max_len = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.converter.tatechuyoko_max_len, 3);
        assert_eq!(config.converter.heading_like_max_len, 10);
        assert!(config.converter.link_urls);
        assert_eq!(config.layout.blank_lines_max, 1);
        assert!(config.layout.end_of_book_marker);
    }

    #[test]
    fn validate_rejects_short_tatechuyoko() {
        let mut config = AppConfig::default();
        config.converter.tatechuyoko_max_len = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tatechuyoko_max_len"));
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("aozorakit-no-such-config.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, AozoraKitError::Io { .. }));
    }
}
