//! Bucket-share comparison of several sources
//!
//! Wraps [`compare_series`] with the optional threshold trim used before
//! bucketing, driven by a JSON [`ComparisonConfig`]. Shares that were
//! bucketized earlier go through [`compare_precomputed`] instead.
//!
//! ```json
//! {
//!   "bins": {
//!     "boundaries": [0, 50000, 100000, "inf"],
//!     "labels": ["<50k", "50k-100k", ">100k"]
//!   },
//!   "rename": {"annual_income": "Lending Club", "scf_2019": "General Borrower in 2019"},
//!   "below": 1000000
//! }
//! ```

use std::collections::BTreeMap;

use lendscope_stats::{
    bucket::{BinSpec, ComparisonTable, RatioTable, compare_series, merge_ratios},
    outlier::remove_below_threshold_all,
    series::Series,
};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Settings of one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Buckets every source is split into.
    pub bins: BinSpec,
    /// Display names for the output columns, keyed by source series name.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    /// When set, values at or above this cutoff are dropped before bucketing.
    #[serde(default)]
    pub below: Option<f64>,
}

/// Runs a comparison over `series`, in the given column order.
///
/// # Examples
///
/// ```
/// use lendscope_analysis::comparison::{ComparisonConfig, run_comparison};
/// use lendscope_stats::series::Series;
///
/// let config: ComparisonConfig = serde_json::from_str(r#"{
///     "bins": {"boundaries": [0, 10, "inf"], "labels": ["small", "large"]},
///     "rename": {"club": "Lending Club"},
///     "below": 100
/// }"#).unwrap();
///
/// let club = Series::new("club", [1.0, 20.0, 500.0, 5.0]);
/// let table = run_comparison(&config, &[club]).unwrap();
/// assert!((table.get("small", "Lending Club").unwrap() - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn run_comparison(
    config: &ComparisonConfig,
    series: &[Series],
) -> Result<ComparisonTable, AnalysisError> {
    let trimmed;
    let series = match config.below {
        Some(boundary) => {
            trimmed = remove_below_threshold_all(series, boundary);
            for (before, after) in series.iter().zip(&trimmed) {
                tracing::debug!(
                    series = before.name(),
                    boundary,
                    dropped = before.len() - after.len(),
                    "trimmed series"
                );
            }
            &trimmed[..]
        }
        None => series,
    };

    let table = compare_series(series, &config.bins, &config.rename)?;
    tracing::debug!(
        sources = table.columns().len(),
        buckets = table.labels().len(),
        "built comparison table"
    );
    Ok(table)
}

/// Lines up bucket shares computed earlier, renaming columns through `rename`.
///
/// No trimming or bucketing happens here; each table keeps the labels it was
/// built with.
pub fn compare_precomputed(
    tables: &[RatioTable],
    rename: &BTreeMap<String, String>,
) -> Result<ComparisonTable, AnalysisError> {
    let table = merge_ratios(tables, rename)?;
    tracing::debug!(
        sources = table.columns().len(),
        buckets = table.labels().len(),
        "merged precomputed shares"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use lendscope_stats::StatsError;

    use super::*;

    fn config(below: Option<f64>) -> ComparisonConfig {
        ComparisonConfig {
            bins: BinSpec::new([0.0, 500.0, f64::INFINITY], ["<500", ">=500"]).unwrap(),
            rename: BTreeMap::new(),
            below,
        }
    }

    #[test]
    fn test_without_trim() {
        let series = [Series::new("a", [100.0, 600.0, 5000.0, 20.0])];
        let table = run_comparison(&config(None), &series).unwrap();
        assert_eq!(table.get("<500", "a"), Some(0.5));
    }

    #[test]
    fn test_trim_before_bucketing() {
        let series = [Series::new("a", [100.0, 600.0, 5000.0, 20.0])];
        let table = run_comparison(&config(Some(1000.0)), &series).unwrap();
        let low = table.get("<500", "a").unwrap();
        assert!((low - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_errors_are_wrapped() {
        let series = [Series::new("a", [5000.0])];
        let err = run_comparison(&config(Some(1000.0)), &series).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Stats(StatsError::EmptyInput { name: "a".into() })
        );

        let mut bad_rename = config(None);
        bad_rename.rename.insert("b".into(), "B".into());
        let err = run_comparison(&bad_rename, &[Series::new("a", [1.0])]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Stats(StatsError::InvalidRename { .. })
        ));
    }

    #[test]
    fn test_precomputed_shares() {
        let club = RatioTable::from_ratios("club", [("<500", 0.25), (">=500", 0.75)]);
        let survey = RatioTable::from_ratios("scf", [("<500", 1.0)]);
        let rename = BTreeMap::from([("scf".to_owned(), "General Borrower".to_owned())]);

        let table = compare_precomputed(&[club, survey], &rename).unwrap();
        assert_eq!(table.columns(), ["club", "General Borrower"]);
        assert_eq!(table.get(">=500", "General Borrower"), Some(0.0));
        assert_eq!(table.get(">=500", "club"), Some(0.75));
    }

    #[test]
    fn test_config_defaults() {
        let config: ComparisonConfig = serde_json::from_str(
            r#"{"bins": {"boundaries": [0, 1], "labels": ["only"]}}"#,
        )
        .unwrap();
        assert!(config.rename.is_empty());
        assert_eq!(config.below, None);
    }
}
