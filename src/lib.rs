//! # uikb
//!
//! Builds a JSON knowledge base for a UI component library and relays
//! generation requests against it.
//!
//! ## Features
//!
//! - Story-file discovery with `.gitignore` support
//! - Tolerant TypeScript extraction of component APIs and examples
//! - Sectioned markdown documentation extraction
//! - Atomic knowledge-base writes
//! - HTTP relay to a hosted generation API
//!
//! ## Quick Start
//!
//! ```no_run
//! use uikb::{Config, Pipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .stories_dir("./stories")
//!     .components_dir("./components")
//!     .output_path("./knowledge_base.json")
//!     .build()?;
//!
//! Pipeline::new(config)?.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The build side follows a pipeline architecture:
//! 1. **Discovery**: Enumerates story files and derives sibling paths
//! 2. **Extractors**: Recover structure, examples, and documentation
//! 3. **Merge**: Combines per-source results into component records
//! 4. **Writer**: Persists the knowledge base atomically
//!
//! The serve side is a stateless relay: it wraps the knowledge base and
//! the caller's prompt in an instruction template and forwards it to the
//! hosted generation API.

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod discover;
mod docs;
mod error;
mod genai;
mod merge;
mod pipeline;
mod prompt;
mod record;
mod server;
mod source;
mod stories;
mod ts;
mod writer;

pub use config::{Config, ConfigBuilder, RelayConfig};
pub use discover::DiscoveryUnit;
pub use docs::{classify_heading, extract_docs, extract_from_markdown, SectionKind};
pub use error::{Error, Result};
pub use genai::GenAiClient;
pub use merge::merge_component;
pub use pipeline::{Pipeline, PipelineStats};
pub use record::{
    ComponentApi, ComponentRecord, DocumentationBlock, EventDescriptor, ExampleConfiguration,
    PropertyDescriptor, VariantDoc, AI_HINT_PLACEHOLDER, VOID_PAYLOAD,
};
pub use server::run_server;
pub use source::{extract_component, SourceApi};
pub use stories::{extract_stories, StoryData};

/// Runs the complete knowledge-base build with the given configuration.
///
/// This is the main entry point for the build side of the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - No story files are found
/// - The knowledge base cannot be written
///
/// # Examples
///
/// ```no_run
/// use uikb::{Config, build};
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .stories_dir("./stories")
///     .components_dir("./components")
///     .build()?;
///
/// build(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn build(config: Config) -> Result<PipelineStats> {
    Pipeline::new(config)?.run().await
}
