//! Load, render and write steps behind the CLI commands.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use heat_store::{load_heatmap, write_heatmap, FormatKind};
use heatmap_common::{HeatmapError, WorldGeometry};
use projection::WorldProjection;
use renderer::{render_png, RenderConfig, RenderSummary, TileOrderIndex};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

/// Files involved in one render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub heatmap: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Render the heatmap in `job` over its base image.
///
/// The output is staged in a temporary file beside the target and only
/// renamed into place when the whole pass succeeded. Library failures are
/// reported as [`HeatmapError`] categories under the returned context.
pub fn run_render(job: &RenderJob, config: &RenderConfig) -> Result<RenderSummary> {
    let projection = WorldProjection::new(config.world)
        .map_err(|e| HeatmapError::configuration(e.to_string()))
        .context("Invalid world geometry")?;

    let loaded = load_heatmap(&job.heatmap, &config.world)
        .map_err(HeatmapError::from)
        .with_context(|| format!("Failed to load heatmap {:?}", job.heatmap))?;
    info!(
        path = ?job.heatmap,
        format = loaded.format.as_str(),
        entries = loaded.store.size(),
        total_steps = loaded.store.total_steps(),
        "Loaded heatmap"
    );
    if loaded.parse_errors > 0 {
        warn!(parse_errors = loaded.parse_errors, "Skipped malformed tile lines");
    }

    let index = TileOrderIndex::build(&loaded.store, &projection);
    drop(loaded);

    let source = File::open(&job.input)
        .with_context(|| format!("Failed to open base image {:?}", job.input))?;
    let staging = NamedTempFile::new_in(output_dir(&job.output))
        .with_context(|| format!("Failed to create temporary file for {:?}", job.output))?;

    let (sink, summary) = render_png(
        BufReader::new(source),
        BufWriter::new(staging),
        index,
        config,
    )
    .map_err(|e| abort_render(job, e.into()))
    .context("Render failed")?;

    let staging = sink
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush rendered image")?;
    staging
        .persist(&job.output)
        .with_context(|| format!("Failed to write {:?}", job.output))?;

    info!(output = ?job.output, "Wrote rendered image");
    Ok(summary)
}

/// Log why a render ended early. The staged output is discarded either way.
fn abort_render(job: &RenderJob, err: HeatmapError) -> HeatmapError {
    if err.is_run_local() {
        error!(
            output = ?job.output,
            error = %err,
            "Render run aborted; inputs untouched, retry may succeed"
        );
    } else {
        error!(output = ?job.output, error = %err, "Render failed");
    }
    err
}

/// Rewrite a heatmap file of any recognised format in the current format.
pub fn run_migrate(heatmap: &Path, output: &Path, world: &WorldGeometry) -> Result<(FormatKind, usize)> {
    let loaded = load_heatmap(heatmap, world)
        .map_err(HeatmapError::from)
        .with_context(|| format!("Failed to load heatmap {:?}", heatmap))?;
    if loaded.parse_errors > 0 {
        warn!(parse_errors = loaded.parse_errors, "Skipped malformed tile lines");
    }

    write_heatmap(&loaded.store, output)
        .map_err(HeatmapError::from)
        .with_context(|| format!("Failed to write heatmap {:?}", output))?;
    info!(
        from = loaded.format.as_str(),
        entries = loaded.store.size(),
        output = ?output,
        "Migrated heatmap"
    );
    Ok((loaded.format, loaded.store.size()))
}

fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
