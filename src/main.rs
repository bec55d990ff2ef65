use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uikb::{Config, Pipeline, RelayConfig};

#[derive(Parser, Debug)]
#[command(
    name = "uikb",
    version,
    author,
    about = "Build a UI component knowledge base and serve generation requests against it",
    long_about = "Build a JSON knowledge base for a UI component library and relay code \
    generation requests against it.\n\n\
    The build command statically analyzes component sources, story files, and markdown \
    documentation, merging them into one knowledge_base.json artifact. The serve command \
    runs a stateless HTTP relay that embeds that artifact into generation requests for a \
    hosted model.\n\n\
    USAGE EXAMPLES:\n  \
      # Build the knowledge base\n  \
      uikb build --stories ./stories --components ./src/components\n\n  \
      # Preview a build without writing the artifact\n  \
      uikb build --stories ./stories --components ./src/components --dry-run\n\n  \
      # Serve the relay on the default port\n  \
      uikb serve --kb ./knowledge_base.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the knowledge base from component sources
    Build(BuildArgs),

    /// Serve the generation relay
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct BuildArgs {
    /// Root directory containing story files
    #[arg(long, env = "UIKB_STORIES_DIR", default_value = "stories", value_name = "PATH")]
    stories: PathBuf,

    /// Root directory containing component definitions
    #[arg(long, env = "UIKB_COMPONENTS_DIR", default_value = "components", value_name = "PATH")]
    components: PathBuf,

    /// Output path of the knowledge base artifact
    #[arg(short, long, env = "UIKB_OUTPUT", default_value = "knowledge_base.json", value_name = "FILE")]
    out: PathBuf,

    /// Filename suffix identifying story files
    #[arg(long, default_value = ".stories.ts")]
    story_suffix: String,

    /// Filename suffix of the sibling component definition
    #[arg(long, default_value = ".component.ts")]
    component_suffix: String,

    /// Filename suffix of the per-directory documentation file
    #[arg(long, default_value = ".doc.mdx")]
    doc_suffix: String,

    /// Dry run (don't write the artifact)
    #[arg(long)]
    dry_run: bool,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Socket address to bind
    #[arg(short, long, env = "UIKB_BIND", default_value = "127.0.0.1:8787", value_name = "ADDR")]
    bind: String,

    /// Path of the knowledge base artifact, re-read on every request
    #[arg(long, env = "UIKB_KB", default_value = "knowledge_base.json", value_name = "FILE")]
    kb: PathBuf,

    /// Hosted model used for generation
    #[arg(short, long, env = "UIKB_MODEL", default_value = "gemini-1.5-flash-latest")]
    model: String,

    /// Base URL of the hosted generation API
    #[arg(
        long,
        env = "UIKB_API_BASE",
        default_value = "https://generativelanguage.googleapis.com/v1beta",
        value_name = "URL"
    )]
    api_base: String,

    /// Environment variable holding the API key
    #[arg(long, default_value = "GEMINI_API_KEY", value_name = "VAR")]
    api_key_env: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Command::Build(args) => {
            let config = Config::builder()
                .stories_dir(args.stories)
                .components_dir(args.components)
                .output_path(args.out)
                .story_suffix(args.story_suffix)
                .component_suffix(args.component_suffix)
                .doc_suffix(args.doc_suffix)
                .dry_run(args.dry_run)
                .build()
                .context("Failed to build configuration")?;

            let stats = Pipeline::new(config)
                .context("Failed to create pipeline")?
                .run()
                .await
                .context("Knowledge base build failed")?;

            stats.print_summary();
        }
        Command::Serve(args) => {
            let config = RelayConfig {
                bind: args.bind,
                kb_path: args.kb,
                model: args.model,
                api_base: args.api_base,
                api_key_env: args.api_key_env,
            };

            uikb::run_server(&config)
                .await
                .context("Relay server failed")?;
        }
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("uikb=info"),
        1 => EnvFilter::new("uikb=debug"),
        _ => EnvFilter::new("uikb=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
