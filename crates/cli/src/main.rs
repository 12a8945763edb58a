//! Hyperseg CLI - quadtree split-and-merge segmentation of spectral cubes

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hyperseg_algorithms::imagery::SpectralDistance;
use hyperseg_algorithms::morphology::Connectivity;
use hyperseg_algorithms::segmentation::{
    segment, AdjacencyMethod, BorderStatistic, Progress, SegmentationOutput, SegmentationParams,
};
use hyperseg_algorithms::texture::sobel_edge;
use hyperseg_colormap::{sidecar_path, ClassTable};
use hyperseg_core::io::{read_cube, read_geotiff, write_geotiff};
use hyperseg_core::{Raster, RasterElement, SpectralCube};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hyperseg")]
#[command(author, version, about = "Split-and-merge segmentation of spectral imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions, bands and per-band statistics of a raster
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Sobel edge map of one band, for use as a segmentation guide
    Edges {
        /// Input cube (GeoTIFF, one or more samples per pixel)
        cube: PathBuf,
        /// Output edge raster
        output: PathBuf,
        /// Zero-based band index
        #[arg(short, long, default_value = "0")]
        band: usize,
    },
    /// Segment a cube guided by an edge map
    Segment {
        /// Edge-intensity raster
        edges: PathBuf,
        /// Output label raster; a `.classes.json` colour table is written next to it
        output: PathBuf,
        /// Cube file(s); several files are stacked as bands
        #[arg(short, long = "cube", required = true, num_args = 1..)]
        cubes: Vec<PathBuf>,
        /// Edge intensity above which a pixel is rough
        #[arg(short, long)]
        split_level: f64,
        /// Largest border distance at which two regions merge
        #[arg(short, long)]
        merge_level: f64,
        /// Distance: sam, euclidean, bray-curtis, sid, intensity
        #[arg(short, long, default_value = "sam")]
        distance: SpectralDistance,
        /// Border statistic: max, mean
        #[arg(long, default_value = "max")]
        statistic: BorderStatistic,
        /// Salt-and-pepper neighbourhood: 4 or 8
        #[arg(long, default_value = "8")]
        connectivity: Connectivity,
        /// Adjacency builder: pixel-scan, pairwise
        #[arg(long, default_value = "pixel-scan")]
        adjacency: AdjacencyMethod,
        /// Seed for the split-point order
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Directory for intermediate rasters (rough, filtered, leaves)
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Reports pipeline stages on a progress bar
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:30}] {pos}/{len}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn message(&mut self, msg: &str) {
        info!("{}", msg);
        self.bar.set_message(msg.to_string());
    }

    fn step(&mut self, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
    }
}

fn load_cube(path: &Path) -> Result<SpectralCube> {
    let pb = spinner("Reading cube...");
    let cube = read_cube(path).with_context(|| format!("Failed to read cube {}", path.display()))?;
    pb.finish_and_clear();
    info!("Cube: {} x {} x {} bands", cube.samples(), cube.lines(), cube.bands());
    Ok(cube)
}

/// Read every file and stack their bands in order
fn load_cubes(paths: &[PathBuf]) -> Result<SpectralCube> {
    let mut cubes = paths.iter().map(|p| load_cube(p)).collect::<Result<Vec<_>>>()?;
    if cubes.len() == 1 {
        return Ok(cubes.remove(0));
    }

    let mut bands = Vec::new();
    for cube in &cubes {
        for b in 0..cube.bands() {
            bands.push(cube.get_band(b)?);
        }
    }
    let mut stacked = SpectralCube::from_bands(&bands).context("Failed to stack cube files")?;
    if let Some(first) = cubes.first() {
        stacked.set_transform(*first.transform());
    }
    Ok(stacked)
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_classes(table: &ClassTable, raster_path: &Path) -> Result<()> {
    let path = sidecar_path(raster_path);
    table
        .write_json(&path)
        .with_context(|| format!("Failed to write class table {}", path.display()))
}

fn write_diagnostics(out: &SegmentationOutput, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    write_result(&out.rough, &dir.join("rough.tif"))?;
    write_result(&out.filtered, &dir.join("filtered.tif"))?;

    let leaves_path = dir.join("leaves.tif");
    write_result(&out.leaves, &leaves_path)?;
    let areas: Vec<usize> = out
        .tree
        .leaves()
        .into_iter()
        .map(|leaf| out.tree.rect(leaf).area())
        .collect();
    write_classes(&ClassTable::for_leaves(&areas), &leaves_path)?;
    info!("Diagnostics written to {}", dir.display());
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn print_stats(label: &str, raster: &Raster<f64>) {
    let stats = raster.statistics();
    println!("{}:", label);
    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        println!("  Range: {:.4} .. {:.4}", min, max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let cube = load_cube(&input)?;
            let transform = cube.transform();
            let bounds = transform.bounds(cube.samples(), cube.lines());

            println!("File: {}", input.display());
            println!(
                "Dimensions: {} samples x {} lines x {} bands",
                cube.samples(),
                cube.lines(),
                cube.bands()
            );
            println!("Cell size: {}", transform.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            for b in 0..cube.bands() {
                print_stats(&format!("Band {}", b), &cube.get_band(b)?);
            }
        }

        Commands::Edges { cube, output, band } => {
            let cube = load_cube(&cube)?;
            if band >= cube.bands() {
                bail!("Band {} out of range, cube has {} bands", band, cube.bands());
            }
            let start = Instant::now();
            let edges = sobel_edge(&cube.get_band(band)?).context("Failed to compute edges")?;
            let elapsed = start.elapsed();
            write_result(&edges, &output)?;
            done("Edge map", &output, elapsed);
        }

        Commands::Segment {
            edges,
            output,
            cubes,
            split_level,
            merge_level,
            distance,
            statistic,
            connectivity,
            adjacency,
            seed,
            diagnostics,
        } => {
            let pb = spinner("Reading edge map...");
            let edge_map: Raster<f64> = read_geotiff(&edges)
                .with_context(|| format!("Failed to read edge map {}", edges.display()))?;
            pb.finish_and_clear();
            let cube = load_cubes(&cubes)?;

            let params = SegmentationParams {
                split_level,
                merge_level,
                distance,
                statistic,
                connectivity,
                adjacency,
                seed,
            };
            info!(
                "Segmenting with {} ({}), split {} merge {}",
                params.distance, params.statistic, params.split_level, params.merge_level
            );

            let start = Instant::now();
            let mut progress = BarProgress::new();
            let out = segment(&edge_map, &cube, &params, &mut progress).context("Segmentation failed")?;
            progress.bar.finish_and_clear();
            let elapsed = start.elapsed();

            info!(
                "{} leaves, {} adjacencies, {} clusters",
                out.leaf_count(),
                out.edge_count,
                out.cluster_count()
            );

            write_result(&out.labels, &output)?;
            let ids = out.cluster_ids().into_iter().map(|id| id.0);
            write_classes(&ClassTable::for_clusters(ids), &output)?;
            if let Some(dir) = diagnostics {
                write_diagnostics(&out, &dir)?;
            }
            done("Segmentation", &output, elapsed);
        }
    }

    Ok(())
}
