//! CropSense CLI - per-point crop health analysis from satellite imagery

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cropsense_imagery::{StacCatalog, StacProvider, StacProviderOptions};
use cropsense_pipeline::{
    analyze, default_date_range, AnalysisRequest, ArtifactStore, PipelineConfig, ResultStore,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cropsense")]
#[command(author, version, about = "Crop health analysis from satellite imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze crop health around a point
    Analyze {
        /// Latitude of the point, degrees
        #[arg(long)]
        lat: f64,
        /// Longitude of the point, degrees
        #[arg(long)]
        lon: f64,
        /// Start of the imagery date window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End of the imagery date window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// STAC catalog: "earth-search" or a custom API URL
        #[arg(long, default_value = "earth-search")]
        catalog: String,
        /// Output directory for the figure and the fused map
        #[arg(short, long, default_value = "cropsense-out")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            lat,
            lon,
            start,
            end,
            catalog,
            out,
        } => {
            let (default_start, default_end) = default_date_range();
            let request = AnalysisRequest::new(
                lat,
                lon,
                start.unwrap_or(default_start),
                end.unwrap_or(default_end),
            )
            .context("invalid analysis request")?;

            let provider = StacProvider::new(
                StacCatalog::from_str_or_url(&catalog),
                StacProviderOptions::default(),
            )
            .context("building imagery provider")?;

            let results = ResultStore::new();
            let artifacts = ArtifactStore::new(&out);
            let config = PipelineConfig::default();

            let pb = spinner("Acquiring imagery and analyzing...");
            let start_time = Instant::now();
            let outcome = analyze(&provider, &results, &artifacts, &config, &request)
                .await
                .context("analysis failed")?;
            pb.finish_and_clear();

            let figure_path = out.join(format!(
                "ndvi_{}_{}_{}_{}.png",
                request.latitude, request.longitude, request.start_date, request.end_date
            ));
            fs::write(&figure_path, &outcome.visualization.png)
                .with_context(|| format!("writing figure to {}", figure_path.display()))?;

            let detection = outcome.detection.rounded();
            println!("Status: {} ({})", detection.status, detection.status_color);
            println!("Diseased area: {:.2}%", detection.diseased_area_pct);
            println!("Healthy area:  {:.2}%", detection.healthy_area_pct);
            println!("Figure: {}", figure_path.display());
            println!("Fused map: {}", outcome.artifact_path.display());
            println!("Done in {:.2?}", start_time.elapsed());
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
