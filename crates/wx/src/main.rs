//! wx CLI - Obsidian notes as WeChat articles.
//!
//! Provides commands for:
//! - `render`: Render a note to HTML with inline styles
//! - `export`: Render a note to self-contained HTML with embedded images
//! - `publish`: Upload a note's images and save it as a draft

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, PublishArgs, RenderArgs};
use output::Output;

/// wx - Obsidian to WeChat article publisher.
#[derive(Parser)]
#[command(name = "wx", version, about)]
struct Cli {
    /// Enable verbose output (render and upload progress).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note to HTML with inline styles.
    Render(RenderArgs),
    /// Render a note to HTML with images embedded as data URIs.
    Export(ExportArgs),
    /// Upload a note's images and save it to the draft box.
    Publish(PublishArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Export(args) => args.execute(),
        Commands::Publish(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
