use crate::error::{Error, Result};
use std::path::PathBuf;

const DEFAULT_STORY_SUFFIX: &str = ".stories.ts";
const DEFAULT_COMPONENT_SUFFIX: &str = ".component.ts";
const DEFAULT_DOC_SUFFIX: &str = ".doc.mdx";
const DEFAULT_OUTPUT_PATH: &str = "knowledge_base.json";

/// Configuration for the knowledge-base build pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory containing story files
    pub stories_dir: PathBuf,

    /// Root directory containing component definitions, mirroring the
    /// story tree's relative layout
    pub components_dir: PathBuf,

    /// Path of the JSON knowledge-base artifact, overwritten each run
    pub output_path: PathBuf,

    /// Filename suffix identifying story files
    pub story_suffix: String,

    /// Filename suffix of the sibling component definition
    pub component_suffix: String,

    /// Filename suffix of the per-directory documentation file
    pub doc_suffix: String,

    /// Dry run mode (no artifact write)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use uikb::Config;
    ///
    /// let config = Config::builder()
    ///     .stories_dir("./stories")
    ///     .components_dir("./components")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Stories or components directory doesn't exist
    /// - A filename suffix is empty or missing its leading dot
    pub fn validate(&self) -> Result<()> {
        if !self.stories_dir.exists() {
            return Err(Error::config(format!(
                "Stories directory does not exist: {}",
                self.stories_dir.display()
            )));
        }

        if !self.stories_dir.is_dir() {
            return Err(Error::config(format!(
                "Stories path is not a directory: {}",
                self.stories_dir.display()
            )));
        }

        if !self.components_dir.exists() {
            return Err(Error::config(format!(
                "Components directory does not exist: {}",
                self.components_dir.display()
            )));
        }

        if !self.components_dir.is_dir() {
            return Err(Error::config(format!(
                "Components path is not a directory: {}",
                self.components_dir.display()
            )));
        }

        for (label, suffix) in [
            ("story_suffix", &self.story_suffix),
            ("component_suffix", &self.component_suffix),
            ("doc_suffix", &self.doc_suffix),
        ] {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(Error::config(format!(
                    "{label} must start with '.' and name an extension, got '{suffix}'"
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stories_dir: PathBuf::from("stories"),
            components_dir: PathBuf::from("components"),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            story_suffix: DEFAULT_STORY_SUFFIX.to_string(),
            component_suffix: DEFAULT_COMPONENT_SUFFIX.to_string(),
            doc_suffix: DEFAULT_DOC_SUFFIX.to_string(),
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    stories_dir: Option<PathBuf>,
    components_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    story_suffix: Option<String>,
    component_suffix: Option<String>,
    doc_suffix: Option<String>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the stories root directory.
    #[must_use]
    pub fn stories_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.stories_dir = Some(path.into());
        self
    }

    /// Sets the components root directory.
    #[must_use]
    pub fn components_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.components_dir = Some(path.into());
        self
    }

    /// Sets the knowledge-base output path.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the story filename suffix.
    #[must_use]
    pub fn story_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.story_suffix = Some(suffix.into());
        self
    }

    /// Sets the component filename suffix.
    #[must_use]
    pub fn component_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.component_suffix = Some(suffix.into());
        self
    }

    /// Sets the documentation filename suffix.
    #[must_use]
    pub fn doc_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.doc_suffix = Some(suffix.into());
        self
    }

    /// Enables dry run mode (no artifact write).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();

        let config = Config {
            stories_dir: self.stories_dir.unwrap_or(defaults.stories_dir),
            components_dir: self.components_dir.unwrap_or(defaults.components_dir),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            story_suffix: self.story_suffix.unwrap_or(defaults.story_suffix),
            component_suffix: self.component_suffix.unwrap_or(defaults.component_suffix),
            doc_suffix: self.doc_suffix.unwrap_or(defaults.doc_suffix),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the relay server.
///
/// The hosted-API key is intentionally not part of this struct: it is
/// read from the environment at request time, so key rotation does not
/// require a restart.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind
    pub bind: String,

    /// Path of the knowledge-base artifact, re-read on every request
    pub kb_path: PathBuf,

    /// Hosted model used for generation
    pub model: String,

    /// Base URL of the hosted generation API
    pub api_base: String,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            kb_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            model: "gemini-1.5-flash-latest".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl RelayConfig {
    /// Validates the relay configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address, model, or API base is empty.
    pub fn validate(&self) -> Result<()> {
        if self.bind.is_empty() {
            return Err(Error::config("Relay bind address must not be empty"));
        }
        if self.model.is_empty() {
            return Err(Error::config("Relay model must not be empty"));
        }
        if self.api_base.is_empty() {
            return Err(Error::config("Relay API base URL must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("stories").create_dir_all().unwrap();
        temp.child("components").create_dir_all().unwrap();

        let config = Config::builder()
            .stories_dir(temp.child("stories").path())
            .components_dir(temp.child("components").path())
            .build()
            .unwrap();

        assert_eq!(config.story_suffix, DEFAULT_STORY_SUFFIX);
        assert_eq!(config.doc_suffix, DEFAULT_DOC_SUFFIX);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_invalid_stories_dir() {
        let result = Config::builder()
            .stories_dir("/nonexistent/path/that/should/not/exist")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_suffix() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("stories").create_dir_all().unwrap();
        temp.child("components").create_dir_all().unwrap();

        let result = Config::builder()
            .stories_dir(temp.child("stories").path())
            .components_dir(temp.child("components").path())
            .story_suffix("stories.ts")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_relay_config_validation() {
        assert!(RelayConfig::default().validate().is_ok());

        let bad = RelayConfig {
            model: String::new(),
            ..RelayConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
