use anyhow::Context;
use clap::Parser;
use generator::sample::{write_sample_bucket, SampleConfig};
use gui_bridge::bridge::GuiBridge;
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{TrackerConfig, RECIPIENT_ENV};
use workflow::runner::Runner;

mod backends;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Earthquake detection sweeper and dashboard bridge")]
struct Args {
    /// Load the tracker config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bucket: Option<String>,
    #[arg(long)]
    region: Option<String>,
    /// Read the bucket from a local directory and log alerts instead of sending SMS
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// Append the sweep summary to the offline report log
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Keep the dashboard bridge alive until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Write a synthetic bucket into this directory before sweeping
    #[arg(long)]
    seed_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    seed_count: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => TrackerConfig::load(path)?
            .with_overrides(args.bucket.clone(), args.region.clone()),
        None => TrackerConfig::from_args(args.bucket.clone(), args.region.clone()),
    }
    .with_recipient_override(std::env::var(RECIPIENT_ENV).ok());

    if let Some(dir) = args.seed_dir.as_ref() {
        let sample = SampleConfig {
            count: args.seed_count,
            seed: args.seed,
        };
        let summary = write_sample_bucket(dir, &sample)
            .with_context(|| format!("seeding sample bucket in {}", dir.display()))?;
        println!(
            "Seeded {} -> documents {}, detection records {}, direct records {}",
            dir.display(),
            summary.documents,
            summary.detection_records,
            summary.direct_records
        );
        if args.store_dir.is_none() && !args.serve && !args.offline {
            return Ok(());
        }
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;
    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: TrackerConfig) -> anyhow::Result<()> {
    let store_dir = args.store_dir.or(args.seed_dir);
    let runner = Runner::connect(&config, store_dir.as_deref()).await;
    let gui_bridge = GuiBridge::new(runner.orchestrator());

    let result = runner.execute().await;
    println!("Sweep -> {}", result.report_line());

    if args.offline {
        let report_path = PathBuf::from("tools/data/offline_sweep.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        writeln!(file, "bucket={} {}", config.bucket, result.report_line())?;
    }

    if args.serve {
        println!("[GUI] HTTP bridge running on {} (Ctrl+C to stop)...", config.bind);
        gui_bridge
            .serve(config.bind, async {
                if let Err(err) = signal::ctrl_c().await {
                    warn!("awaiting Ctrl+C failed: {}", err);
                }
            })
            .await?;
    }

    Ok(())
}
