//! Heatmap renderer.
//!
//! Overlays a player's visit heatmap on the world map image, or migrates
//! heatmap files to the current on-disk format.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pipeline::{run_migrate, run_render, RenderJob};

#[derive(Parser, Debug)]
#[command(name = "heatmap-renderer")]
#[command(about = "Render visit heatmaps onto the world map")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a heatmap over a base image
    Render(RenderArgs),

    /// Rewrite a heatmap file in the current format
    Migrate(MigrateArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Heatmap file (current or legacy format)
    #[arg(short = 'm', long)]
    heatmap: PathBuf,

    /// Base PNG image
    #[arg(short, long)]
    input: PathBuf,

    /// Output PNG image
    #[arg(short, long)]
    output: PathBuf,

    /// Rows per stripe
    #[arg(long, conflicts_with = "stripes")]
    stripe_height: Option<u32>,

    /// Number of equal stripes
    #[arg(long)]
    stripes: Option<u32>,

    /// Heat overlay transparency (0-1)
    #[arg(long)]
    transparency: Option<f32>,

    /// Configuration file path
    #[arg(short, long, env = "HEATMAP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MigrateArgs {
    /// Heatmap file to read
    #[arg(short = 'm', long)]
    heatmap: PathBuf,

    /// Where to write the migrated file
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file path (for the world geometry)
    #[arg(short, long, env = "HEATMAP_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json)?;

    match cli.command {
        Command::Render(args) => render(args),
        Command::Migrate(args) => migrate(args),
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = config::load_render_config(args.config.as_deref())?;
    if let Some(rows) = args.stripe_height {
        config.stripe_height = rows;
        config.stripe_count = None;
    }
    if let Some(count) = args.stripes {
        config.stripe_count = Some(count);
    }
    if let Some(transparency) = args.transparency {
        config.transparency = transparency;
    }
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    info!(
        stripes = ?config.stripe_layout(),
        transparency = config.transparency,
        sensitivity = config.sensitivity,
        "Starting heatmap render"
    );

    let job = RenderJob {
        heatmap: args.heatmap,
        input: args.input,
        output: args.output,
    };
    let summary = run_render(&job, &config)?;

    info!(
        painted = summary.tiles.painted,
        faults = summary.tiles.faults,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Done"
    );
    Ok(())
}

fn migrate(args: MigrateArgs) -> Result<()> {
    let config = config::load_render_config(args.config.as_deref())?;
    let (format, entries) = run_migrate(&args.heatmap, &args.output, &config.world)?;
    info!(from = format.as_str(), entries = entries, "Done");
    Ok(())
}
