use std::{collections::BTreeMap, path::PathBuf};

use clap::Args;
use lendscope_analysis::comparison::{self, ComparisonConfig};
use lendscope_stats::bucket::{ComparisonTable, RatioTable};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    /// Path to the comparison config JSON file (bins, rename, below)
    #[arg(long, required_unless_present = "ratios")]
    pub config: Option<PathBuf>,

    /// Paths to series JSON files; columns follow argument order
    #[arg(required_unless_present = "ratios", conflicts_with = "ratios")]
    pub series: Vec<PathBuf>,

    /// Paths to ratio table JSON files written by `bucketize`, merged as they are
    #[arg(long, num_args = 1..)]
    pub ratios: Vec<PathBuf>,

    /// Drop values at or above this cutoff, overriding the config
    #[arg(long, allow_hyphen_values = true, conflicts_with = "ratios")]
    pub below: Option<f64>,

    /// Also write the comparison table as JSON to this path
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: CompareArg) -> anyhow::Result<()> {
    let config = arg
        .config
        .as_ref()
        .map(|path| util::read_json_file::<ComparisonConfig, _>("comparison config", path))
        .transpose()?;

    let table = match config {
        Some(config) if arg.ratios.is_empty() => compare_series(config, &arg)?,
        config => {
            let rename = config.map(|c| c.rename).unwrap_or_default();
            compare_ratios(&arg.ratios, &rename)?
        }
    };

    println!("Bucket Share Comparison");
    println!("=======================\n");
    print!("{table}");

    if let Some(path) = arg.output {
        Output::save_json(&table, Some(path))?;
    }
    Ok(())
}

fn compare_series(
    mut config: ComparisonConfig,
    arg: &CompareArg,
) -> anyhow::Result<ComparisonTable> {
    if arg.below.is_some() {
        config.below = arg.below;
    }
    let series = util::read_series_files(&arg.series)?;
    tracing::info!(
        sources = series.len(),
        buckets = config.bins.labels().len(),
        below = ?config.below,
        "comparing bucket shares"
    );
    Ok(comparison::run_comparison(&config, &series)?)
}

fn compare_ratios(
    paths: &[PathBuf],
    rename: &BTreeMap<String, String>,
) -> anyhow::Result<ComparisonTable> {
    let tables = paths
        .iter()
        .map(|path| util::read_json_file::<RatioTable, _>("ratio table", path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    tracing::info!(sources = tables.len(), "comparing precomputed bucket shares");
    Ok(comparison::compare_precomputed(&tables, rename)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_compare_bucketized_files() {
        let dir = tempfile::tempdir().unwrap();
        let club = dir.path().join("club.json");
        let scf = dir.path().join("scf.json");
        fs::write(
            &club,
            r#"{"name": "club", "buckets": [{"label": "low", "count": 1, "ratio": 0.25}, {"label": "high", "count": 3, "ratio": 0.75}], "covered": 4, "uncovered": 0}"#,
        )
        .unwrap();
        fs::write(&scf, r#"{"name": "scf", "buckets": [{"label": "low", "ratio": 1.0}]}"#).unwrap();

        let rename = BTreeMap::from([("club".to_owned(), "Lending Club".to_owned())]);
        let table = compare_ratios(&[club, scf], &rename).unwrap();
        assert_eq!(table.columns(), ["Lending Club", "scf"]);
        assert_eq!(table.get("high", "scf"), Some(0.0));
        assert_eq!(table.get("low", "Lending Club"), Some(0.25));
    }
}
