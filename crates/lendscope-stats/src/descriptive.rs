use serde::Serialize;

use crate::{percentiles::compute_percentile, series::Series};

/// Descriptive statistics summarizing a series.
///
/// Holds the five-number summary used by box plots (min, quartiles, max)
/// alongside the mean and dispersion. Quartiles use linear interpolation
/// (see [`compute_percentile`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Number of present values.
    pub count: usize,
    /// Number of missing values that were skipped.
    pub missing: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// The arithmetic mean of the present values.
    pub mean: f64,
    /// Population variance of the present values.
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics for the present values of a series.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the series has at least one present value
    /// * `None` - if every value is missing, or the series is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use lendscope_stats::{descriptive::DescriptiveStats, series::Series};
    /// let series = Series::from_options("debt", [Some(5.0), Some(2.0), None, Some(4.0), Some(1.0), Some(3.0)]);
    /// let stats = DescriptiveStats::new(&series).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.missing, 1);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.q1, 2.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.q3, 4.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// ```
    #[must_use]
    pub fn new(series: &Series) -> Option<Self> {
        Self::from_sorted(&series.sorted_present(), series.missing_count())
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], missing: usize) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            missing,
            min,
            q1: compute_percentile(sorted_values, 25.0),
            median: compute_percentile(sorted_values, 50.0),
            q3: compute_percentile(sorted_values, 75.0),
            max,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    /// Interquartile range, `q3 - q1`.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}
