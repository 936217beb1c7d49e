use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use landclip::config::{CleanupConfig, CombineConfig, FileConfig, ReduceConfig};
use landclip::io::OutputStyle;
use landclip::pipeline::{run_cleanup, run_combine, run_reduce};

/// Rebuild land polygons from coastline linework and clip regions to them
///
/// Examples:
///   # Clip prefectures to the land enclosed by a coastline
///   landclip combine --regions prefectures.geojson --coastline coastline.geojson -o land_only.geojson
///
///   # Drop islets under 1 km² and close slivers left by clipping
///   landclip cleanup -i land_only.geojson -o closed.geojson --min-area 1000000
///
///   # Strip coastline properties down to "id"
///   landclip reduce -i coastline.geojson
///
///   # Use a config file
///   landclip --config my-settings.toml combine
#[derive(Parser, Debug)]
#[command(name = "landclip")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (optional, auto-searches landclip.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clip region polygons to the land enclosed by coastline lines
    Combine(CombineArgs),
    /// Explode parts, drop small ones and close slivers
    Cleanup(CleanupArgs),
    /// Keep only selected feature properties
    Reduce(ReduceArgs),
}

#[derive(Args, Debug)]
struct CombineArgs {
    /// Region polygons (GeoJSON FeatureCollection)
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Coastline lines (GeoJSON FeatureCollection)
    #[arg(long)]
    coastline: Option<PathBuf>,

    /// Output GeoJSON path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output layout
    #[arg(long)]
    style: Option<OutputStyle>,
}

#[derive(Args, Debug)]
struct CleanupArgs {
    /// Input polygons
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output GeoJSON path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Smallest part kept, in square meters
    #[arg(long)]
    min_area: Option<f64>,

    /// Grow/shrink distance used to close gaps, in meters
    #[arg(long)]
    buffer: Option<f64>,

    /// EPSG code of the metric CRS used for areas and buffers
    #[arg(long)]
    metric_crs: Option<u32>,

    /// EPSG code of the output CRS
    #[arg(long)]
    geographic_crs: Option<u32>,

    /// Output layout
    #[arg(long)]
    style: Option<OutputStyle>,
}

#[derive(Args, Debug)]
struct ReduceArgs {
    /// Input features
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output path (defaults to {input}_filtered.geojson)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Property to keep; repeat for several (defaults to "id")
    #[arg(short = 'k', long = "keep")]
    keep: Vec<String>,

    /// Output layout
    #[arg(long)]
    style: Option<OutputStyle>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .init();

    let file_config = if let Some(ref config_path) = cli.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let total_start = Instant::now();
    let output = match cli.command {
        Command::Combine(args) => combine(args.apply(file_config.combine))?,
        Command::Cleanup(args) => cleanup(args.apply(file_config.cleanup))?,
        Command::Reduce(args) => reduce(args.apply(file_config.reduce))?,
    };

    println!(
        "Done. Wrote {} [{:.1}s]",
        output.display(),
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

impl CombineArgs {
    /// Command-line values win over the config file
    fn apply(self, mut config: CombineConfig) -> CombineConfig {
        if let Some(regions) = self.regions {
            config.regions = regions;
        }
        if let Some(coastline) = self.coastline {
            config.coastline = coastline;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        config
    }
}

impl CleanupArgs {
    fn apply(self, mut config: CleanupConfig) -> CleanupConfig {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(min_area) = self.min_area {
            config.min_area = min_area;
        }
        if let Some(buffer) = self.buffer {
            config.buffer_distance = buffer;
        }
        if let Some(crs) = self.metric_crs {
            config.metric_crs = crs;
        }
        if let Some(crs) = self.geographic_crs {
            config.geographic_crs = crs;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        config
    }
}

impl ReduceArgs {
    fn apply(self, mut config: ReduceConfig) -> ReduceConfig {
        if let Some(input) = self.input {
            config.input = input;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if !self.keep.is_empty() {
            config.keep = self.keep;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        config
    }
}

fn combine(config: CombineConfig) -> Result<PathBuf> {
    log::debug!("Configuration: {:?}", config);

    let spinner = create_spinner("Rebuilding land and clipping regions...");
    let start = Instant::now();
    let report = run_combine(&config).context("Failed to clip regions to land")?;
    spinner.finish_with_message(format!(
        "Clipped {} regions to {} land parts ({} empty) [{:.1}s]",
        report.clip.features,
        report.land_parts,
        report.clip.degenerate,
        start.elapsed().as_secs_f32()
    ));

    Ok(config.output)
}

fn cleanup(config: CleanupConfig) -> Result<PathBuf> {
    log::debug!("Configuration: {:?}", config);

    let spinner = create_spinner("Exploding, filtering and closing polygons...");
    let start = Instant::now();
    let report = run_cleanup(&config).context("Failed to clean up polygons")?;
    spinner.finish_with_message(format!(
        "Kept {} of {} parts ({} under {} m², {} empty) [{:.1}s]",
        report.written,
        report.parts,
        report.dropped_small,
        config.min_area,
        report.degenerate,
        start.elapsed().as_secs_f32()
    ));

    Ok(config.output)
}

fn reduce(config: ReduceConfig) -> Result<PathBuf> {
    log::debug!("Configuration: {:?}", config);

    let spinner = create_spinner("Reducing properties...");
    let start = Instant::now();
    let written = run_reduce(&config).context("Failed to reduce properties")?;
    spinner.finish_with_message(format!(
        "Kept {:?} on {} features [{:.1}s]",
        config.keep,
        written,
        start.elapsed().as_secs_f32()
    ));

    Ok(config.output_path())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
