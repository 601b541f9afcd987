//! Knowledge Graph Generator CLI
//!
//! Turns free-form text into an interactive knowledge graph page.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kgraph_agents::{ExtractionSchema, Extractor, GroqOracle, OracleConfig, Pipeline};
use kgraph_core::{GraphBuilder, GraphDocument};
use kgraph_render::{RenderConfig, RenderOutcome, Renderer, DEFAULT_OUTPUT_FILE};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

const EMPTY_INPUT_WARNING: &str = "Please provide text or upload a file!";

/// Knowledge Graph Generator - extract entities and relationships from text
#[derive(Parser)]
#[command(name = "kgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a graph from text and write the interactive page
    Generate {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        oracle: OracleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract a graph from text and print the raw documents as JSON
    Extract {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        oracle: OracleArgs,
    },

    /// Render previously extracted documents without calling the model
    Render {
        /// JSON file holding one graph document or a list of them
        documents: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Read text from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Text to process (stdin is read when neither --file nor --text is given)
    #[arg(short, long)]
    text: Option<String>,
}

#[derive(Args)]
struct OracleArgs {
    /// Model name (overrides GROQ_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Node types to extract (comma-separated)
    #[arg(long, value_delimiter = ',')]
    allowed_nodes: Vec<String>,

    /// Relationship types to extract (comma-separated)
    #[arg(long, value_delimiter = ',')]
    allowed_relationships: Vec<String>,

    /// Only suggest the allowed types instead of enforcing them
    #[arg(long)]
    lenient: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Where to write the page (overwritten if it exists)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Heading shown above the graph
    #[arg(long)]
    title: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate {
            input,
            oracle,
            output,
        } => {
            cmd_generate(input, oracle, output).await?;
        }
        Commands::Extract { input, oracle } => {
            cmd_extract(input, oracle).await?;
        }
        Commands::Render { documents, output } => {
            cmd_render(documents, output)?;
        }
    }

    Ok(())
}

async fn cmd_generate(input: InputArgs, oracle: OracleArgs, output: OutputArgs) -> Result<()> {
    let text = read_input(&input)?;

    let pipeline = Pipeline::new(build_extractor(&oracle), build_renderer(&output));
    let report = pipeline
        .run(&text)
        .await
        .context("Failed to generate knowledge graph")?;

    println!("✓ Knowledge graph generated successfully!");
    print_outcome(&report.render);
    if report.build.dropped_relationships > 0 {
        println!(
            "  • Relationships dropped (unknown endpoints): {}",
            report.build.dropped_relationships
        );
    }

    Ok(())
}

async fn cmd_extract(input: InputArgs, oracle: OracleArgs) -> Result<()> {
    let text = read_input(&input)?;

    let documents = build_extractor(&oracle)
        .extract(&text)
        .await
        .context("Extraction failed")?;

    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}

fn cmd_render(path: PathBuf, output: OutputArgs) -> Result<()> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let documents = GraphDocument::list_from_json(&content)
        .with_context(|| format!("Failed to parse graph documents from: {}", path.display()))?;

    let (graph, stats) = GraphBuilder::build_with_stats(&documents)?;
    debug!("Build stats: {:?}", stats);

    let outcome = build_renderer(&output).render(&graph)?;

    println!("✓ Rendered knowledge graph from {}", path.display());
    print_outcome(&outcome);
    Ok(())
}

/// Text from --text, --file or stdin; empty input stops here
fn read_input(input: &InputArgs) -> Result<String> {
    let text = match (&input.text, &input.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        (None, None) => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                eprintln!("Enter text (Ctrl+D to finish):");
            }
            let mut buffer = String::new();
            stdin.lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        anyhow::bail!(EMPTY_INPUT_WARNING);
    }

    Ok(text)
}

fn build_extractor(args: &OracleArgs) -> Extractor {
    let mut config = OracleConfig::from_env();
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    debug!("Oracle config: {:?}", config);

    let mut schema = ExtractionSchema::new(
        args.allowed_nodes.clone(),
        args.allowed_relationships.clone(),
    );
    if args.lenient {
        schema = schema.lenient();
    }

    Extractor::new(GroqOracle::new(config)).with_schema(schema)
}

fn build_renderer(args: &OutputArgs) -> Renderer {
    let mut config = RenderConfig::default().with_output_path(&args.output);
    if let Some(title) = &args.title {
        config = config.with_heading(title.clone());
    }
    Renderer::new(config)
}

fn print_outcome(outcome: &RenderOutcome) {
    println!("  • Output: {}", outcome.path.display());
    println!("  • Nodes: {}", outcome.nodes_rendered);
    println!("  • Edges: {}", outcome.edges_rendered);
    if !outcome.is_complete() {
        println!(
            "  • Skipped: {} nodes, {} edges",
            outcome.skipped_nodes, outcome.skipped_edges
        );
    }
}
