use crate::{
    config::Config,
    error::{Error, Result},
    record::ComponentRecord,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Writes the knowledge base to disk with atomic operations.
pub(crate) struct Writer {
    output_path: PathBuf,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_path: config.output_path.clone(),
        }
    }

    /// Serializes the records as a pretty-printed JSON array and writes
    /// them to the output path, replacing any previous run's output.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Serialization fails
    /// - File write operations fail
    pub(crate) fn write(&self, records: &[ComponentRecord]) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let content = serde_json::to_string_pretty(records)?;
        self.write_file_atomic(&self.output_path, &content)?;

        info!(
            "Wrote {} component records to {}",
            records.len(),
            self.output_path.display()
        );
        Ok(())
    }

    /// Writes a file atomically.
    ///
    /// Content goes to a temporary sibling first, is synced to disk, and
    /// is then renamed over the target, so a crash mid-write never leaves
    /// a truncated knowledge base behind.
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ComponentApi, DocumentationBlock, AI_HINT_PLACEHOLDER};
    use assert_fs::prelude::*;

    fn create_test_config(root: &Path, output: &Path) -> Config {
        std::fs::create_dir_all(root.join("stories")).unwrap();
        std::fs::create_dir_all(root.join("components")).unwrap();

        Config::builder()
            .stories_dir(root.join("stories"))
            .components_dir(root.join("components"))
            .output_path(output)
            .build()
            .unwrap()
    }

    fn badge_record() -> ComponentRecord {
        ComponentRecord {
            name: "Badge".to_string(),
            selector: "ui-badge".to_string(),
            ai_hint: AI_HINT_PLACEHOLDER.to_string(),
            api: ComponentApi::default(),
            documentation: DocumentationBlock::default(),
            examples: vec![],
        }
    }

    #[test]
    fn test_writer_produces_json_array() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("out/knowledge_base.json");

        let config = create_test_config(temp.path(), output.path());
        Writer::new(&config).write(&[badge_record()]).unwrap();

        let parsed: Vec<ComponentRecord> =
            serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].selector, "ui-badge");
    }

    #[test]
    fn test_writer_replaces_previous_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("knowledge_base.json");
        output.write_str("[\"stale\"]").unwrap();

        let config = create_test_config(temp.path(), output.path());
        Writer::new(&config).write(&[]).unwrap();

        let content = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn test_writer_leaves_no_temp_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("knowledge_base.json");

        let config = create_test_config(temp.path(), output.path());
        Writer::new(&config).write(&[badge_record()]).unwrap();

        assert!(!temp.child("knowledge_base.tmp").exists());
    }
}
