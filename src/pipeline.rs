use crate::{
    config::Config,
    discover::{Discovery, DiscoveryUnit},
    docs, merge,
    record::ComponentRecord,
    source, stories,
    writer::Writer,
};
use crate::error::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Number of story files discovered
    pub components_discovered: usize,

    /// Number of records that passed the completeness gate
    pub components_written: usize,

    /// Number of discovered components that were skipped
    pub components_skipped: usize,

    /// Total execution time
    pub duration: Duration,

    /// Time spent discovering story files
    pub discover_duration: Duration,

    /// Time spent extracting and merging
    pub extract_duration: Duration,

    /// Time spent writing the artifact
    pub write_duration: Duration,

    /// Output artifact path
    pub output_path: String,
}

impl PipelineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║          Knowledge Base Build Summary                 ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Components Found:     {:>8}                        ║",
            self.components_discovered
        );
        println!(
            "║   - Written:          {:>8}                        ║",
            self.components_written
        );
        println!(
            "║   - Skipped:          {:>8}                        ║",
            self.components_skipped
        );
        println!("║ Output:                                               ║");
        println!(
            "║   {}                                              ║",
            self.output_path
        );
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Discovery:        {:>8.2}s                     ║",
            self.discover_duration.as_secs_f64()
        );
        println!(
            "║   - Extraction:       {:>8.2}s                     ║",
            self.extract_duration.as_secs_f64()
        );
        println!(
            "║   - Writing:          {:>8.2}s                     ║",
            self.write_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Main pipeline orchestrator for building the component knowledge base.
pub struct Pipeline {
    config: Config,
    discovery: Discovery,
    writer: Writer,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation or discovery
    /// initialization fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let discovery = Discovery::new(&config)?;
        let writer = Writer::new(&config);

        Ok(Self {
            config,
            discovery,
            writer,
        })
    }

    /// Executes the complete pipeline and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Discover**: Enumerates story files and derives sibling paths
    /// 2. **Extract**: Runs the three extractors per component and merges
    /// 3. **Write**: Persists the knowledge base artifact
    ///
    /// Components run sequentially; within one component the three
    /// extractors run concurrently. A component that fails its own
    /// extraction is skipped with a log line, never aborting the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery finds no story files or the final
    /// write fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use uikb::{Config, Pipeline};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .stories_dir("./stories")
    ///     .components_dir("./components")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run().await?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(stories_dir = %self.config.stories_dir.display()))]
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        info!("Starting knowledge base build");

        // Stage 1: Discovery
        info!("Stage 1/3: Discovering story files...");
        let discover_start = Instant::now();
        let units = self.discovery.discover()?;
        let discover_duration = discover_start.elapsed();

        let components_discovered = units.len();
        info!(
            "✓ Discovered {} story files in {:.2}s",
            components_discovered,
            discover_duration.as_secs_f64()
        );

        // Stage 2: Extraction and merge
        info!("Stage 2/3: Extracting component data...");
        let extract_start = Instant::now();

        let mut records = Vec::with_capacity(units.len());
        for unit in &units {
            if let Some(record) = self.process_unit(unit).await {
                records.push(record);
            }
        }
        let extract_duration = extract_start.elapsed();

        let components_written = records.len();
        let components_skipped = components_discovered - components_written;
        info!(
            "✓ Merged {} components ({} skipped) in {:.2}s",
            components_written,
            components_skipped,
            extract_duration.as_secs_f64()
        );

        self.log_duplicate_selectors(&records);

        // Stage 3: Writing
        let write_start = Instant::now();
        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping artifact write");
        } else {
            info!("Stage 3/3: Writing knowledge base...");
            self.writer.write(&records)?;
        }
        let write_duration = write_start.elapsed();

        let total_duration = start_time.elapsed();
        info!(
            "✓ Build completed successfully in {:.2}s",
            total_duration.as_secs_f64()
        );

        Ok(PipelineStats {
            components_discovered,
            components_written,
            components_skipped,
            duration: total_duration,
            discover_duration,
            extract_duration,
            write_duration,
            output_path: self.config.output_path.display().to_string(),
        })
    }

    /// Extracts and merges one discovered component.
    ///
    /// Returns `None` when the component fails the completeness gate.
    async fn process_unit(&self, unit: &DiscoveryUnit) -> Option<ComponentRecord> {
        let (source_api, story_data, documentation) = tokio::join!(
            source::extract_component(&unit.component_path),
            stories::extract_stories(&unit.story_path),
            docs::extract_docs(&unit.component_dir, &self.config.doc_suffix),
        );

        let Some(source_api) = source_api else {
            warn!(
                "Skipping '{}': no component definition recovered from {}",
                unit.base_name,
                unit.component_path.display()
            );
            return None;
        };

        match merge::merge_component(source_api, story_data, documentation) {
            Some(record) => Some(record),
            None => {
                warn!(
                    "Skipping '{}': incomplete data (missing selector or story title)",
                    unit.base_name
                );
                None
            }
        }
    }

    /// Warns about selector collisions; duplicates are kept in the output.
    fn log_duplicate_selectors(&self, records: &[ComponentRecord]) {
        let mut seen = HashSet::new();
        for record in records {
            if !seen.insert(record.selector.as_str()) {
                warn!(
                    "Duplicate selector '{}' (component '{}')",
                    record.selector, record.name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const BADGE_COMPONENT: &str = r"
        import { Component, EventEmitter, Input, Output } from '@angular/core';

        @Component({
          selector: 'ui-badge',
          template: '<span class=badge><ng-content></ng-content></span>',
        })
        export class BadgeComponent {
          @Input() variant: 'info' | 'warning' = 'info';
          @Input() dismissible = false;
          @Output() dismissed = new EventEmitter<void>();
        }
    ";

    const BADGE_STORIES: &str = r"
        const meta = {
          title: 'Badge',
          aiHint: 'Use for small status labels',
          argTypes: {
            variant: { description: 'Visual tone of the badge' },
          },
        };
        export default meta;

        export const Default = {
          args: { variant: 'info' },
        };
    ";

    const BADGE_DOC: &str = "\
## Description

A compact status label.

## Anatomy

- Container
- Label text
";

    fn write_badge_fixture(temp: &assert_fs::TempDir) {
        temp.child("stories/badge/badge.stories.ts")
            .write_str(BADGE_STORIES)
            .unwrap();
        temp.child("components/badge/badge.component.ts")
            .write_str(BADGE_COMPONENT)
            .unwrap();
        temp.child("components/badge/badge.doc.mdx")
            .write_str(BADGE_DOC)
            .unwrap();
    }

    fn create_test_config(root: &std::path::Path) -> Config {
        Config::builder()
            .stories_dir(root.join("stories"))
            .components_dir(root.join("components"))
            .output_path(root.join("knowledge_base.json"))
            .build()
            .unwrap()
    }

    async fn run_build(root: &std::path::Path) -> PipelineStats {
        Pipeline::new(create_test_config(root))
            .unwrap()
            .run()
            .await
            .unwrap()
    }

    fn read_kb(root: &std::path::Path) -> Vec<ComponentRecord> {
        let content = std::fs::read_to_string(root.join("knowledge_base.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_badge_fixture(&temp);

        let stats = run_build(temp.path()).await;
        assert_eq!(stats.components_discovered, 1);
        assert_eq!(stats.components_written, 1);
        assert_eq!(stats.components_skipped, 0);

        let records = read_kb(temp.path());
        assert_eq!(records.len(), 1);

        let badge = &records[0];
        assert_eq!(badge.name, "Badge");
        assert_eq!(badge.selector, "ui-badge");
        assert_eq!(badge.ai_hint, "Use for small status labels");

        assert_eq!(badge.api.inputs.len(), 2);
        let variant = &badge.api.inputs[0];
        assert_eq!(variant.name, "variant");
        assert_eq!(
            variant.description.as_deref(),
            Some("Visual tone of the badge")
        );
        assert_eq!(
            variant.allowed_values.as_deref(),
            Some(&["info".to_string(), "warning".to_string()][..])
        );

        assert_eq!(badge.api.outputs.len(), 1);
        assert_eq!(badge.api.outputs[0].payload_type, "void");

        assert_eq!(badge.documentation.general_description, "A compact status label.");
        assert_eq!(badge.documentation.anatomy.len(), 2);
        assert_eq!(badge.examples.len(), 1);
        assert_eq!(badge.examples[0].name, "Default");
    }

    #[tokio::test]
    async fn test_pipeline_skips_story_without_component() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_badge_fixture(&temp);
        temp.child("stories/ghost/ghost.stories.ts")
            .write_str(BADGE_STORIES)
            .unwrap();

        let stats = run_build(temp.path()).await;
        assert_eq!(stats.components_discovered, 2);
        assert_eq!(stats.components_written, 1);
        assert_eq!(stats.components_skipped, 1);

        let records = read_kb(temp.path());
        assert!(records.iter().all(|r| r.name != "Ghost"));
    }

    #[tokio::test]
    async fn test_pipeline_skips_component_without_title() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("stories/badge/badge.stories.ts")
            .write_str("const meta = { aiHint: 'x' };")
            .unwrap();
        temp.child("components/badge/badge.component.ts")
            .write_str(BADGE_COMPONENT)
            .unwrap();

        let stats = run_build(temp.path()).await;
        assert_eq!(stats.components_written, 0);

        assert_eq!(read_kb(temp.path()).len(), 0);
    }

    #[tokio::test]
    async fn test_pipeline_missing_doc_yields_empty_documentation() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_badge_fixture(&temp);
        std::fs::remove_file(temp.path().join("components/badge/badge.doc.mdx")).unwrap();

        run_build(temp.path()).await;

        let records = read_kb(temp.path());
        assert!(records[0].documentation.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_is_idempotent() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_badge_fixture(&temp);

        run_build(temp.path()).await;
        let first = std::fs::read_to_string(temp.path().join("knowledge_base.json")).unwrap();

        run_build(temp.path()).await;
        let second = std::fs::read_to_string(temp.path().join("knowledge_base.json")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_pipeline_dry_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_badge_fixture(&temp);

        let config = Config::builder()
            .stories_dir(temp.path().join("stories"))
            .components_dir(temp.path().join("components"))
            .output_path(temp.path().join("knowledge_base.json"))
            .dry_run(true)
            .build()
            .unwrap();

        let stats = Pipeline::new(config).unwrap().run().await.unwrap();
        assert_eq!(stats.components_written, 1);
        assert!(!temp.child("knowledge_base.json").exists());
    }

    #[tokio::test]
    async fn test_pipeline_orders_records_by_story_path() {
        let temp = assert_fs::TempDir::new().unwrap();
        for name in ["zeta", "alpha"] {
            temp.child(format!("stories/{name}/{name}.stories.ts"))
                .write_str(&BADGE_STORIES.replace("Badge", name))
                .unwrap();
            temp.child(format!("components/{name}/{name}.component.ts"))
                .write_str(BADGE_COMPONENT)
                .unwrap();
        }

        run_build(temp.path()).await;

        let records = read_kb(temp.path());
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
