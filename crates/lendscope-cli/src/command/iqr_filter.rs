use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use lendscope_stats::{frame::Frame, outlier};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct IqrFilterArg {
    /// Path to the frame JSON file
    pub frame: PathBuf,

    /// Column whose quartile fence decides which rows are outliers
    #[arg(long)]
    pub column: String,

    /// Keep only these columns in the output (comma-separated; default: all)
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Output file path for the filtered frame (default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: IqrFilterArg) -> anyhow::Result<()> {
    let frame: Frame = util::read_json_file("frame", &arg.frame)?;
    tracing::debug!(
        rows = frame.num_rows(),
        columns = ?frame.column_names().collect::<Vec<_>>(),
        "loaded frame"
    );

    let series = frame.series(&arg.column)?;
    let fence = outlier::iqr_fence(&series)?;
    tracing::info!(
        column = %arg.column,
        q1 = fence.q1,
        q3 = fence.q3,
        lower = fence.lower,
        upper = fence.upper,
        "quartile fence"
    );

    let mut filtered = outlier::apply_iqr_filter(&frame, &arg.column)
        .with_context(|| format!("Failed to filter column '{}'", arg.column))?;
    tracing::info!(
        rows_before = frame.num_rows(),
        rows_after = filtered.num_rows(),
        "removed outliers and incomplete rows"
    );

    if !arg.keep.is_empty() {
        let keep = arg.keep.iter().map(String::as_str).collect::<Vec<_>>();
        filtered = filtered.select(&keep)?;
    }

    Output::save_json(&filtered, arg.output)
}
