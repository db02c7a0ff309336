//! Parser configuration.
//!
//! Configuration is optional; every field has a default, so an empty file
//! (or no file at all) yields [`ParserConfig::default`]. Keys are
//! kebab-case:
//!
//! ```yaml
//! canonical-extension: kt
//! emit-parse-events: true
//! fingerprint-content: false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::selector::CANONICAL_EXTENSION;

/// Conventional name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "parsefront.yaml";

/// Maximum canonical extension length
pub const MAX_EXTENSION_LENGTH: usize = 16;

/// Settings for a [`Parser`](crate::Parser).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Extension (without the dot) that selects the whole-file grammar.
    pub canonical_extension: String,

    /// Report parse events to the tracing observer. When off, events are
    /// discarded.
    pub emit_parse_events: bool,

    /// Fingerprint parsed content so cache hits on changed content are
    /// reported. The cached tree is served either way.
    pub fingerprint_content: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            canonical_extension: CANONICAL_EXTENSION.to_string(),
            emit_parse_events: true,
            fingerprint_content: false,
        }
    }
}

impl ParserConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if it is not valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed YAML, unknown keys, or values
    /// that fail [`ParserConfig::validate`].
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    /// Write the configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails or [`Error::Io`] if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the canonical extension is empty, too
    /// long, or contains anything other than ASCII letters and digits.
    pub fn validate(&self) -> Result<()> {
        validate_extension(&self.canonical_extension)
    }
}

/// Validate a canonical extension given without its leading dot.
///
/// # Errors
///
/// Returns [`Error::Config`] describing the first rule `extension` breaks.
pub fn validate_extension(extension: &str) -> Result<()> {
    if extension.is_empty() {
        return Err(Error::Config(
            "canonical-extension must not be empty".to_string(),
        ));
    }

    if extension.len() > MAX_EXTENSION_LENGTH {
        return Err(Error::Config(format!(
            "canonical-extension cannot exceed {MAX_EXTENSION_LENGTH} characters"
        )));
    }

    if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Config(format!(
            "canonical-extension `{extension}` must contain only letters and digits (no leading dot)"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn empty_input_gives_defaults() {
        assert_eq!(
            ParserConfig::from_yaml_str("").expect("empty config"),
            ParserConfig::default()
        );
        assert_eq!(
            ParserConfig::from_yaml_str("  \n").expect("blank config"),
            ParserConfig::default()
        );
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config =
            ParserConfig::from_yaml_str("fingerprint-content: true\n").expect("valid config");

        assert!(config.fingerprint_content);
        assert!(config.emit_parse_events);
        assert_eq!(config.canonical_extension, "kt");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = ParserConfig::from_yaml_str("cache-size: 10\n").expect_err("unknown key");
        assert!(matches!(error, Error::Config(_)));
    }

    #[rstest]
    #[case::empty("")]
    #[case::leading_dot(".kt")]
    #[case::separator("k/t")]
    #[case::too_long("abcdefghijklmnopq")]
    fn invalid_extensions(#[case] extension: &str) {
        let result = validate_extension(extension);
        assert!(
            matches!(result, Err(Error::Config(_))),
            "expected `{extension}` to be rejected"
        );
    }

    #[test]
    fn invalid_extension_in_file_is_rejected() {
        let result = ParserConfig::from_yaml_str("canonical-extension: '.kt'\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = ParserConfig {
            canonical_extension: "kts".to_string(),
            emit_parse_events: false,
            fingerprint_content: true,
        };

        config.save(&path).expect("save");
        let loaded = ParserConfig::load(&path).expect("load");

        assert_eq!(loaded, config);
        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(text.contains("canonical-extension: kts"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().expect("temp dir");
        let result = ParserConfig::load(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
