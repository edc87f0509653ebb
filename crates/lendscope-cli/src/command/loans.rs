use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use lendscope_analysis::loan::{self, LoanField, LoanRecord};
use lendscope_stats::outlier;

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct LoansArg {
    /// Path to the loan records JSON file (array of records)
    pub loans: PathBuf,

    /// Numeric columns to project into the finished-loans frame (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["debt_to_income", "emp_length"])]
    pub columns: Vec<String>,

    /// Remove quartile-fence outliers of this column from the frame
    #[arg(long)]
    pub iqr_column: Option<String>,

    /// Write the finished-loans frame (rows with missing values dropped) to this path
    #[arg(long)]
    pub frame_output: Option<PathBuf>,

    /// Column of the finished loans to export as a series for `compare`
    #[arg(long, requires = "series_output")]
    pub series_column: Option<String>,

    /// Write the `--series-column` series of finished loans to this path
    #[arg(long, requires = "series_column")]
    pub series_output: Option<PathBuf>,

    /// Write all categorized loans as JSON to this path
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: LoansArg) -> anyhow::Result<()> {
    let fields = arg
        .columns
        .iter()
        .map(|name| LoanField::from_column(name))
        .collect::<Result<Vec<_>, _>>()?;
    let records: Vec<LoanRecord> = util::read_json_file("loans", &arg.loans)?;

    let categorized = loan::categorize(&records);
    println!("Loan Categories ({} records)", records.len());
    println!("==============================\n");
    for (category, count) in categorized.counts() {
        println!("  {:<14} {count:>8}", category.to_string());
    }
    println!(
        "  {:<14} {:>8}",
        "Uncategorized",
        records.len() - categorized.all.len()
    );
    println!("  {:<14} {:>8}", "Finished", categorized.finished.len());

    if let Some(path) = arg.frame_output {
        let frame = loan::loans_frame(categorized.finished.iter().map(|l| &l.record), &fields)?;
        let mut frame = frame.drop_missing();
        if let Some(column) = &arg.iqr_column {
            frame = outlier::apply_iqr_filter(&frame, column)
                .with_context(|| format!("Failed to filter column '{column}'"))?;
        }
        tracing::info!(rows = frame.num_rows(), "built finished-loans frame");
        Output::save_json(&frame, Some(path))?;
    }

    if let (Some(column), Some(path)) = (&arg.series_column, arg.series_output) {
        let field = LoanField::from_column(column)?;
        let series = loan::loan_series(
            column,
            categorized.finished.iter().map(|l| &l.record),
            field,
        );
        tracing::info!(
            column = %column,
            len = series.len(),
            missing = series.missing_count(),
            "extracted finished-loans series"
        );
        Output::save_json(&series, Some(path))?;
    }

    if let Some(path) = arg.output {
        Output::save_json(&categorized.all, Some(path))?;
    }
    Ok(())
}
