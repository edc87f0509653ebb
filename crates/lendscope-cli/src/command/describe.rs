use std::path::PathBuf;

use clap::Args;
use lendscope_stats::{
    descriptive::DescriptiveStats,
    outlier::OutlierReport,
    percentiles::Percentiles,
    series::Series,
};
use serde::Serialize;

use crate::util::{self, Output};

const PERCENTILE_POINTS: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

#[derive(Debug, Clone, Args)]
pub(crate) struct DescribeArg {
    /// Paths to series JSON files
    #[arg(required = true)]
    pub series: Vec<PathBuf>,

    /// Also write the summaries as JSON to this path
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SeriesDescription {
    name: String,
    stats: DescriptiveStats,
    outliers: OutlierReport,
}

pub(crate) fn run(arg: DescribeArg) -> anyhow::Result<()> {
    let series = util::read_series_files(&arg.series)?;

    let mut descriptions = Vec::new();
    for s in &series {
        let Some(stats) = DescriptiveStats::new(s) else {
            tracing::warn!(series = s.name(), "no present values, skipping");
            continue;
        };
        let outliers = OutlierReport::new(s)?;
        print_description(s, &stats, &outliers);
        println!();
        descriptions.push(SeriesDescription {
            name: s.name().to_owned(),
            stats,
            outliers,
        });
    }

    if let Some(path) = arg.output {
        Output::save_json(&descriptions, Some(path))?;
    }
    Ok(())
}

fn print_description(series: &Series, stats: &DescriptiveStats, outliers: &OutlierReport) {
    println!("{}", series.name());
    println!(
        "  count {:>8}   missing {:>8}",
        stats.count, stats.missing
    );
    println!(
        "  min {:>12.3}   q1 {:>12.3}   median {:>12.3}   q3 {:>12.3}   max {:>12.3}",
        stats.min, stats.q1, stats.median, stats.q3, stats.max
    );
    println!(
        "  mean {:>11.3}   std {:>11.3}",
        stats.mean, stats.std_dev
    );

    let percentiles = Percentiles::new(&series.sorted_present(), &PERCENTILE_POINTS);
    let line = percentiles
        .iter()
        .map(|(p, value)| format!("P{p:02}={value:.3}"))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  {line}");

    let fence = &outliers.fence;
    println!(
        "  fence [{:.3}, {:.3}]  outliers {} low / {} high ({:.2}%)",
        fence.lower,
        fence.upper,
        outliers.low,
        outliers.high,
        outliers.percent()
    );
}
