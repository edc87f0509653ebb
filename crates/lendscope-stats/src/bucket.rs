//! Labeled right-closed binning and bucket share tables
//!
//! A [`BinSpec`] describes `n` labeled buckets through `n + 1` strictly
//! increasing boundaries. A value `v` lands in bucket `i` when
//! `boundaries[i] < v <= boundaries[i + 1]`; anything at or below the first
//! boundary, above the last boundary, or missing is left uncovered.
//!
//! [`bucketize`] turns a [`Series`] into a [`RatioTable`] holding each
//! bucket's share of the covered values. [`merge_ratios`] lines several ratio
//! tables up side by side in a [`ComparisonTable`].
//!
//! Buckets that receive no values are always kept, with a share of `0.0`.
//! The merge step follows the same rule and fills gaps with `0.0`.
//!
//! # Examples
//!
//! ```
//! use lendscope_stats::{bucket::{BinSpec, bucketize}, series::Series};
//!
//! let spec = BinSpec::new(
//!     [0.0, 500.0, 1000.0, 2000.0, f64::INFINITY],
//!     ["<500", "500-1000", "1000-2000", ">2000"],
//! )
//! .unwrap();
//! let income = Series::new(
//!     "income",
//!     [100.0, 200.0, 1450.0, 2334.0, 556.0, 439.0, 3749.0, 3888.0, 20.0],
//! );
//!
//! let table = bucketize(&income, &spec).unwrap();
//! assert!((table.ratio("<500").unwrap() - 4.0 / 9.0).abs() < 1e-12);
//! assert!((table.ratio(">2000").unwrap() - 3.0 / 9.0).abs() < 1e-12);
//! ```

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::{StatsError, series::Series};

/// Boundaries and labels of a set of right-closed buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BinSpecRepr", into = "BinSpecRepr")]
pub struct BinSpec {
    boundaries: Vec<f64>,
    labels: Vec<String>,
}

impl BinSpec {
    /// Validates and builds a bin specification.
    ///
    /// Fails with [`StatsError::InvalidBinSpec`] when there are fewer than two
    /// boundaries, when `boundaries.len() != labels.len() + 1`, when a
    /// boundary is `NaN`, when boundaries are not strictly increasing, or when
    /// a label repeats.
    pub fn new<B, L>(boundaries: B, labels: L) -> Result<Self, StatsError>
    where
        B: IntoIterator<Item = f64>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let boundaries = boundaries.into_iter().collect::<Vec<_>>();
        let labels = labels.into_iter().map(Into::into).collect::<Vec<String>>();

        if boundaries.len() < 2 {
            return Err(StatsError::invalid_bin_spec(format!(
                "need at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        if boundaries.len() != labels.len() + 1 {
            return Err(StatsError::invalid_bin_spec(format!(
                "{} boundaries cannot delimit {} labels",
                boundaries.len(),
                labels.len()
            )));
        }
        if boundaries.iter().any(|b| b.is_nan()) {
            return Err(StatsError::invalid_bin_spec("boundary is NaN"));
        }
        if let Some(pair) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
            return Err(StatsError::invalid_bin_spec(format!(
                "boundaries must be strictly increasing, found {} then {}",
                pair[0], pair[1]
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(label) = labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(StatsError::invalid_bin_spec(format!(
                "label '{label}' appears more than once"
            )));
        }

        Ok(Self { boundaries, labels })
    }

    #[must_use]
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the bucket index covering `value`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lendscope_stats::bucket::BinSpec;
    /// let spec = BinSpec::new([0.0, 10.0, 20.0], ["low", "high"]).unwrap();
    /// assert_eq!(spec.bucket_of(0.0), None);
    /// assert_eq!(spec.bucket_of(10.0), Some(0));
    /// assert_eq!(spec.bucket_of(10.5), Some(1));
    /// assert_eq!(spec.bucket_of(20.5), None);
    /// ```
    #[must_use]
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        // first boundary >= value
        let upper = self.boundaries.partition_point(|&b| b < value);
        if upper == 0 || upper == self.boundaries.len() {
            None
        } else {
            Some(upper - 1)
        }
    }
}

/// JSON form of [`BinSpec`]. Boundaries may be numbers or strings such as
/// `"inf"` and `"-inf"`, since JSON has no literal for infinity.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinSpecRepr {
    boundaries: Vec<BoundaryRepr>,
    labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum BoundaryRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<BinSpecRepr> for BinSpec {
    type Error = StatsError;

    fn try_from(repr: BinSpecRepr) -> Result<Self, Self::Error> {
        let boundaries = repr
            .boundaries
            .into_iter()
            .map(|b| match b {
                BoundaryRepr::Number(n) => Ok(n),
                BoundaryRepr::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                    StatsError::invalid_bin_spec(format!("boundary '{text}' is not a number"))
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(boundaries, repr.labels)
    }
}

impl From<BinSpec> for BinSpecRepr {
    fn from(spec: BinSpec) -> Self {
        let boundaries = spec
            .boundaries
            .into_iter()
            .map(|b| {
                if b.is_finite() {
                    BoundaryRepr::Number(b)
                } else {
                    BoundaryRepr::Text(b.to_string())
                }
            })
            .collect();
        Self {
            boundaries,
            labels: spec.labels,
        }
    }
}

/// One bucket of a [`RatioTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRatio {
    pub label: String,
    /// Number of covered values falling in this bucket.
    #[serde(default)]
    pub count: usize,
    /// `count` divided by the number of covered values.
    pub ratio: f64,
}

/// Share of covered values per bucket, in bin order.
///
/// The JSON form written by `lendscope bucketize` can be read back, so shares
/// computed earlier (or elsewhere) can be merged without the raw values.
/// Counts are optional there and default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioTable {
    name: String,
    buckets: Vec<BucketRatio>,
    #[serde(default)]
    covered: usize,
    #[serde(default)]
    uncovered: usize,
}

impl RatioTable {
    /// Builds a table from already computed shares. Counts are unknown and
    /// recorded as zero.
    #[must_use]
    pub fn from_ratios<I, S>(name: impl Into<String>, ratios: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let buckets = ratios
            .into_iter()
            .map(|(label, ratio)| BucketRatio {
                label: label.into(),
                count: 0,
                ratio,
            })
            .collect();
        Self {
            name: name.into(),
            buckets,
            covered: 0,
            uncovered: 0,
        }
    }

    /// Name of the source series.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn buckets(&self) -> &[BucketRatio] {
        &self.buckets
    }

    #[must_use]
    pub fn ratio(&self, label: &str) -> Option<f64> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.ratio)
    }

    /// Number of values that fell into some bucket.
    #[must_use]
    pub fn covered(&self) -> usize {
        self.covered
    }

    /// Number of entries left out: missing, or outside every bucket.
    #[must_use]
    pub fn uncovered(&self) -> usize {
        self.uncovered
    }

    #[must_use]
    pub fn total_ratio(&self) -> f64 {
        self.buckets.iter().map(|b| b.ratio).sum()
    }
}

/// Computes each bucket's share of the covered values in `series`.
///
/// Missing values and values outside every bucket are excluded from both
/// numerator and denominator. Every label of `spec` appears in the result,
/// in bin order, even when its count is zero.
///
/// Fails with [`StatsError::EmptyInput`] when no value is covered.
#[expect(clippy::cast_precision_loss)]
pub fn bucketize(series: &Series, spec: &BinSpec) -> Result<RatioTable, StatsError> {
    let mut counts = vec![0_usize; spec.labels.len()];
    let mut uncovered = 0;
    for value in series.values() {
        match value.and_then(|v| spec.bucket_of(v)) {
            Some(idx) => counts[idx] += 1,
            None => uncovered += 1,
        }
    }

    let covered = counts.iter().sum::<usize>();
    if covered == 0 {
        return Err(StatsError::empty_input(series.name()));
    }

    let buckets = spec
        .labels
        .iter()
        .zip(counts)
        .map(|(label, count)| BucketRatio {
            label: label.clone(),
            count,
            ratio: count as f64 / covered as f64,
        })
        .collect();

    Ok(RatioTable {
        name: series.name().to_owned(),
        buckets,
        covered,
        uncovered,
    })
}

/// Bucket shares of several sources aligned by label.
///
/// Rows are the union of the input labels in first-seen order, columns follow
/// input order. Absent label/source combinations hold `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    labels: Vec<String>,
    columns: Vec<String>,
    /// Row-major: `values[row][column]`.
    values: Vec<Vec<f64>>,
}

impl ComparisonTable {
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Share of `label` in `column`.
    #[must_use]
    pub fn get(&self, label: &str, column: &str) -> Option<f64> {
        let row = self.labels.iter().position(|l| l == label)?;
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.values[row][col])
    }

    /// Iterates over `(label, shares)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .labels
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(5);
        let widths = self
            .columns
            .iter()
            .map(|c| c.len().max(8))
            .collect::<Vec<_>>();

        write!(f, "{:<label_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {column:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.rows() {
            write!(f, "{label:<label_width$}")?;
            for (value, width) in row.iter().zip(&widths) {
                write!(f, "  {value:>width$.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Aligns several ratio tables into one [`ComparisonTable`].
///
/// Columns are named after each table's source name, then renamed through
/// `rename` (original name to display name).
///
/// # Errors
///
/// * [`StatsError::DuplicateColumn`] if two tables share a name, or if renaming
///   makes two columns collide
/// * [`StatsError::InvalidRename`] if a key of `rename` is not a column
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use lendscope_stats::bucket::{RatioTable, merge_ratios};
///
/// let club = RatioTable::from_ratios("club_income", [("low", 0.25), ("high", 0.75)]);
/// let survey = RatioTable::from_ratios("scf_income", [("low", 1.0)]);
/// let rename = BTreeMap::from([("club_income".to_owned(), "Lending Club".to_owned())]);
///
/// let table = merge_ratios(&[club, survey], &rename).unwrap();
/// assert_eq!(table.columns(), ["Lending Club", "scf_income"]);
/// assert_eq!(table.get("high", "scf_income"), Some(0.0));
/// ```
pub fn merge_ratios(
    tables: &[RatioTable],
    rename: &BTreeMap<String, String>,
) -> Result<ComparisonTable, StatsError> {
    let mut columns = Vec::with_capacity(tables.len());
    for table in tables {
        if columns.contains(&table.name) {
            return Err(StatsError::DuplicateColumn {
                column: table.name.clone(),
            });
        }
        columns.push(table.name.clone());
    }

    if let Some(missing) = rename.keys().find(|key| !columns.contains(key)) {
        return Err(StatsError::InvalidRename {
            column: missing.clone(),
        });
    }
    let columns = columns
        .into_iter()
        .map(|c| rename.get(&c).cloned().unwrap_or(c))
        .collect::<Vec<_>>();
    let mut seen = BTreeSet::new();
    if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(StatsError::DuplicateColumn {
            column: dup.clone(),
        });
    }

    let mut labels = Vec::<String>::new();
    for bucket in tables.iter().flat_map(|t| &t.buckets) {
        if !labels.contains(&bucket.label) {
            labels.push(bucket.label.clone());
        }
    }

    let values = labels
        .iter()
        .map(|label| {
            tables
                .iter()
                .map(|t| t.ratio(label).unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(ComparisonTable {
        labels,
        columns,
        values,
    })
}

/// Bucketizes every series with the same `spec`, then merges the results.
pub fn compare_series(
    series: &[Series],
    spec: &BinSpec,
    rename: &BTreeMap<String, String>,
) -> Result<ComparisonTable, StatsError> {
    let tables = series
        .iter()
        .map(|s| bucketize(s, spec))
        .collect::<Result<Vec<_>, _>>()?;
    merge_ratios(&tables, rename)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn income_spec() -> BinSpec {
        BinSpec::new(
            [0.0, 500.0, 1000.0, 2000.0, f64::INFINITY],
            ["<500", "500-1000", "1000-2000", ">2000"],
        )
        .unwrap()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value present");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_income_buckets() {
        let series = Series::new(
            "INCOME",
            [100.0, 200.0, 1450.0, 2334.0, 556.0, 439.0, 3749.0, 3888.0, 20.0],
        );
        let table = bucketize(&series, &income_spec()).unwrap();

        assert_eq!(table.name(), "INCOME");
        assert_close(table.ratio("<500"), 4.0 / 9.0);
        assert_close(table.ratio("500-1000"), 1.0 / 9.0);
        assert_close(table.ratio("1000-2000"), 1.0 / 9.0);
        assert_close(table.ratio(">2000"), 3.0 / 9.0);
        assert_eq!(table.covered(), 9);
        assert_eq!(table.uncovered(), 0);
        let labels = table.buckets().iter().map(|b| b.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["<500", "500-1000", "1000-2000", ">2000"]);
    }

    #[test]
    fn test_right_closed_edges() {
        let spec = BinSpec::new([0.0, 1.0, 2.0], ["a", "b"]).unwrap();
        // 0.0 sits on the open left edge, 3.0 above the last edge
        let series = Series::from_options("x", [Some(0.0), Some(1.0), Some(2.0), Some(3.0), None]);
        let table = bucketize(&series, &spec).unwrap();
        assert_eq!(table.buckets()[0].count, 1);
        assert_eq!(table.buckets()[1].count, 1);
        assert_eq!(table.covered(), 2);
        assert_eq!(table.uncovered(), 3);
        assert_close(table.ratio("a"), 0.5);
    }

    #[test]
    fn test_empty_buckets_are_kept() {
        let series = Series::new("x", [10.0, 20.0]);
        let table = bucketize(&series, &income_spec()).unwrap();
        assert_eq!(table.buckets().len(), 4);
        assert_eq!(table.ratio(">2000"), Some(0.0));
    }

    #[test]
    fn test_nothing_covered() {
        let spec = income_spec();
        let err = bucketize(&Series::new("x", [-5.0, 0.0]), &spec).unwrap_err();
        assert_eq!(err, StatsError::EmptyInput { name: "x".into() });

        let err = bucketize(&Series::from_options("y", [None]), &spec).unwrap_err();
        assert!(matches!(err, StatsError::EmptyInput { .. }));
    }

    #[test]
    fn test_invalid_specs() {
        let cases: [(Vec<f64>, Vec<&str>); 5] = [
            (vec![0.0, 1.0], vec!["a", "b"]),
            (vec![0.0], vec![]),
            (vec![0.0, 1.0, 1.0], vec!["a", "b"]),
            (vec![0.0, f64::NAN, 2.0], vec!["a", "b"]),
            (vec![0.0, 1.0, 2.0], vec!["a", "a"]),
        ];
        for (boundaries, labels) in cases {
            let result = BinSpec::new(boundaries.clone(), labels);
            assert!(
                matches!(result, Err(StatsError::InvalidBinSpec { .. })),
                "{boundaries:?} accepted"
            );
        }
    }

    #[test]
    fn test_spec_json_infinity() {
        let spec: BinSpec = serde_json::from_str(
            r#"{"boundaries": [0, 500, "inf"], "labels": ["<500", ">=500"]}"#,
        )
        .unwrap();
        assert_eq!(spec.boundaries(), [0.0, 500.0, f64::INFINITY]);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["boundaries"][2], "inf");

        let bad = serde_json::from_str::<BinSpec>(r#"{"boundaries": [0, "lots"], "labels": ["a"]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_merge_three_sources() {
        let a = Series::new(
            "a_INCOME",
            [100.0, 200.0, 1450.0, 2334.0, 556.0, 439.0, 3749.0, 3888.0, 20.0],
        );
        let b = Series::new(
            "b_INCOME",
            [
                100.0, 200.0, 1450.0, 2334.0, 556.0, 439.0, 3749.0, 3888.0, 20.0, 484.0, 588.0,
                88.0,
            ],
        );
        let c = Series::new(
            "c_INCOME",
            [
                10.0, 20.0, 150.0, 234.0, 56.0, 439.0, 3749.0, 3888.0, 20.0, 49.0, 599.0, 2.0,
            ],
        );
        let rename = BTreeMap::from([
            ("a_INCOME".to_owned(), "a".to_owned()),
            ("b_INCOME".to_owned(), "b".to_owned()),
            ("c_INCOME".to_owned(), "c".to_owned()),
        ]);

        let table = compare_series(&[a, b, c], &income_spec(), &rename).unwrap();
        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.labels(), ["<500", "500-1000", "1000-2000", ">2000"]);
        assert_close(table.get("<500", "b"), 0.5);
        assert_close(table.get("<500", "c"), 0.75);
        assert_close(table.get(">2000", "c"), 2.0 / 12.0);
        assert_close(table.get("500-1000", "b"), 2.0 / 12.0);
        assert_close(table.get("1000-2000", "c"), 0.0);
        assert_eq!(table.get("<500", "a_INCOME"), None);

        let text = table.to_string();
        assert!(text.lines().next().unwrap().contains('c'));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_merge_union_of_labels() {
        let x = RatioTable::from_ratios("x", [("a", 0.5), ("b", 0.5)]);
        let y = RatioTable::from_ratios("y", [("c", 1.0), ("a", 0.0)]);
        let table = merge_ratios(&[x, y], &BTreeMap::new()).unwrap();
        assert_eq!(table.labels(), ["a", "b", "c"]);
        assert_eq!(table.get("c", "x"), Some(0.0));
        assert_eq!(table.get("b", "y"), Some(0.0));
    }

    #[test]
    fn test_merge_precomputed_json() {
        let club = Series::new("club", [100.0, 700.0, 900.0, 3000.0]);
        let computed = bucketize(&club, &income_spec()).unwrap();
        let json = serde_json::to_string(&computed).unwrap();
        let reloaded: RatioTable = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, computed);

        let survey: RatioTable = serde_json::from_str(
            r#"{"name": "scf", "buckets": [{"label": "<500", "ratio": 0.4}, {"label": ">2000", "ratio": 0.6}]}"#,
        )
        .unwrap();
        assert_eq!(survey.covered(), 0);
        assert_eq!(survey.buckets()[0].count, 0);

        let table = merge_ratios(&[reloaded, survey], &BTreeMap::new()).unwrap();
        assert_eq!(table.columns(), ["club", "scf"]);
        assert_close(table.get("500-1000", "club"), 0.5);
        assert_close(table.get(">2000", "scf"), 0.6);
        assert_close(table.get("1000-2000", "scf"), 0.0);
    }

    #[test]
    fn test_merge_rename_errors() {
        let x = RatioTable::from_ratios("x", [("a", 1.0)]);
        let y = RatioTable::from_ratios("y", [("a", 1.0)]);

        let rename = BTreeMap::from([("z".to_owned(), "zed".to_owned())]);
        let err = merge_ratios(&[x.clone(), y.clone()], &rename).unwrap_err();
        assert_eq!(err, StatsError::InvalidRename { column: "z".into() });

        let rename = BTreeMap::from([("x".to_owned(), "y".to_owned())]);
        let err = merge_ratios(&[x.clone(), y], &rename).unwrap_err();
        assert_eq!(err, StatsError::DuplicateColumn { column: "y".into() });

        let err = merge_ratios(&[x.clone(), x], &BTreeMap::new()).unwrap_err();
        assert_eq!(err, StatsError::DuplicateColumn { column: "x".into() });
    }

    proptest! {
        #[test]
        fn prop_ratios_sum_to_one(values in prop::collection::vec(-100.0..3000.0_f64, 1..200)) {
            let series = Series::new("x", values);
            if let Ok(table) = bucketize(&series, &income_spec()) {
                prop_assert!((table.total_ratio() - 1.0).abs() < 1e-9);
                prop_assert_eq!(table.covered() + table.uncovered(), series.len());
            }
        }

        #[test]
        fn prop_order_independent(values in prop::collection::vec(1.0..5000.0_f64, 1..100)) {
            let forward = bucketize(&Series::new("x", values.clone()), &income_spec()).unwrap();
            let mut reversed_values = values;
            reversed_values.reverse();
            let reversed = bucketize(&Series::new("x", reversed_values), &income_spec()).unwrap();
            prop_assert_eq!(forward, reversed);
        }
    }
}
