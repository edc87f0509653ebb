use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use lendscope_stats::bucket::{self, BinSpec};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct BucketizeArg {
    /// Path to the series JSON file (the first series is used)
    pub series: PathBuf,

    /// Bucket boundaries, strictly increasing (comma-separated, `inf` allowed)
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub bins: Vec<f64>,

    /// Bucket labels, one fewer than boundaries (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub labels: Vec<String>,

    /// Output file path for the ratio table (default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: BucketizeArg) -> anyhow::Result<()> {
    let spec = BinSpec::new(arg.bins, arg.labels)?;
    let series = util::read_series_files(&[&arg.series])?
        .into_iter()
        .next()
        .with_context(|| format!("No series in {}", arg.series.display()))?;

    let table = bucket::bucketize(&series, &spec)
        .with_context(|| format!("Failed to bucketize '{}'", series.name()))?;
    tracing::info!(
        series = series.name(),
        covered = table.covered(),
        uncovered = table.uncovered(),
        "bucketized series"
    );

    Output::save_json(&table, arg.output)
}
