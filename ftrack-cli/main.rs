use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ftrack_cli::{BenchmarkConfig, ImageSequence, NativeBackend, SweepDriver, TrackError, TrackResult};
use log::{error, info, warn};

#[derive(Parser)]
#[command(version, about, author)]
struct FtrackCli {
    /// TOML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing `images/`, with a trailing separator
    #[arg(long)]
    data_path: Option<String>,

    /// Where the CSV reports are written
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Save side-by-side match images for every frame pair
    #[arg(long)]
    visualize: bool,

    /// Run the configurations of a group concurrently
    #[arg(long)]
    parallel: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn effective_config(cli: &FtrackCli) -> TrackResult<BenchmarkConfig> {
    let mut config = match &cli.config {
        Some(path) => BenchmarkConfig::load(path)?,
        None => BenchmarkConfig::default(),
    };
    if let Some(data_path) = &cli.data_path {
        config.data_path = data_path.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    config.visualize |= cli.visualize;
    config.parallel |= cli.parallel;
    config.validate()?;
    Ok(config)
}

fn run(cli: FtrackCli) -> TrackResult<()> {
    let config = effective_config(&cli)?;
    if cli.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }
    info!("{}", config.summary());

    ftrack_core::init_thread_pool(config.effective_threads())?;
    let output_dir = config.output_path();
    std::fs::create_dir_all(&output_dir).map_err(|source| TrackError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let backend = NativeBackend::new(&config)?;
    let source = ImageSequence::from_config(&config);
    let outcome = SweepDriver::new(&config, &backend, &source).run();

    for (configuration, reason) in &outcome.failures {
        warn!("skipped {}: {}", configuration, reason);
    }
    info!(
        "{} configurations succeeded, {} failed, {} reports written",
        outcome.succeeded,
        outcome.failures.len(),
        outcome.reports.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = FtrackCli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
