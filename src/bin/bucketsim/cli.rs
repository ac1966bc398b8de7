use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Leaky-bucket admission control simulator", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop the simulation after this long (e.g. "30s"). Runs until
    /// ctrl-c when absent.
    #[arg(long, value_parser = parse_duration)]
    pub run_for: Option<Duration>,

    /// Override the bucket capacity.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub capacity: Option<usize>,

    /// Override the minimum worker-pool size.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub min_workers: Option<usize>,

    /// Override the maximum worker-pool size.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub max_workers: Option<usize>,

    /// Pre-fill the queue with this many requests before starting.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub prefill: Option<usize>,

    /// Emit logs through a JSON layer (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "bucketsim=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
