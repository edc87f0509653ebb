use std::path::PathBuf;

use clap::Args;
use lendscope_stats::outlier;

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct TrimArg {
    /// Paths to series JSON files
    #[arg(required = true)]
    pub series: Vec<PathBuf>,

    /// Keep only values strictly below this cutoff
    #[arg(long, allow_hyphen_values = true)]
    pub below: f64,

    /// Output file path for the trimmed series (default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: TrimArg) -> anyhow::Result<()> {
    let series = util::read_series_files(&arg.series)?;
    let trimmed = outlier::remove_below_threshold_all(&series, arg.below);

    for (before, after) in series.iter().zip(&trimmed) {
        tracing::info!(
            series = before.name(),
            kept = after.len(),
            dropped = before.len() - after.len(),
            "trimmed at {}",
            arg.below
        );
    }

    Output::save_json(&trimmed, arg.output)
}
