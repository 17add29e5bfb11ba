use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;
use wupstream::Network;

#[derive(Parser)]
#[command(name = "wupstream", version)]
#[command(about = "Find the upstream features between starting points and controllers")]
struct Cli {
    /// Network in JSON format
    network: PathBuf,
    /// Starting points, whitespace-separated ids
    starting_points: PathBuf,
    /// Output file, one feature id per line
    output: PathBuf,
    /// Log the time taken by each phase
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let total = Instant::now();
    let network = Network::load(&cli.network, &cli.starting_points)
        .context("Failed to load network")?;
    tracing::info!(
        points = network.graph().node_count(),
        edges = network.graph().edge_count(),
        "loaded {}",
        cli.network.display()
    );

    let file = File::create(&cli.output)
        .with_context(|| format!("Cannot open output file {}", cli.output.display()))?;
    let mut out = BufWriter::new(file);
    network
        .run(&mut out)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    tracing::info!(elapsed = ?total.elapsed(), "wrote {}", cli.output.display());
    Ok(())
}
