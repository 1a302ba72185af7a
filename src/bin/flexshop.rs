use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use u_flexshop::config::ExperimentConfig;
use u_flexshop::experiment::Experiment;
use u_flexshop::results::ResultsWriter;

#[derive(Debug, Parser)]
#[command(name = "flexshop")]
#[command(about = "Run seeded dispatching-rule benchmarks on generated flexible job shop instances.")]
struct Args {
    /// Experiment configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Base directory for result files.
    #[arg(long, default_value = "results")]
    output: PathBuf,
    /// Override the number of seeds.
    #[arg(long)]
    seeds: Option<u64>,
    /// Override the test name.
    #[arg(long)]
    test_name: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = ExperimentConfig::from_file(&args.config)
        .with_context(|| format!("load config {}", args.config.display()))?;
    if let Some(seeds) = args.seeds {
        config = config.with_num_seeds(seeds);
    }
    if let Some(name) = args.test_name {
        config = config.with_test_name(name);
    }

    let experiment = Experiment::new(config).context("prepare experiment")?;
    let results = experiment.run().context("run experiment")?;
    let written = ResultsWriter::new(&args.output)
        .write(&results)
        .context("write results")?;

    println!("{:=<50}", "");
    println!("RESULTS SUMMARY");
    println!("{:=<50}", "");
    for (kind, stats) in results.stats() {
        println!("{kind}:");
        println!("  Valid runs: {}/{}", stats.valid_runs, stats.runs);
        println!("  Average makespan: {:.2} (std {:.2})", stats.avg_makespan, stats.makespan_std);
        println!("  Average gap to lower bound: {:.2}%", stats.avg_gap * 100.0);
        println!("  Best makespan: {:.2}", stats.min_makespan);
        println!("  Worst makespan: {:.2}", stats.max_makespan);
        println!("  Average time: {:.4}s", stats.avg_time_secs);
    }
    println!("\nResults saved to {}", written.summary.display());

    if !results.all_valid() {
        anyhow::bail!("some schedules failed validation");
    }
    Ok(())
}
