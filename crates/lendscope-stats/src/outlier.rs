//! Outlier removal
//!
//! Two independent strategies:
//!
//! - **Hard threshold** ([`remove_below_threshold`]): keep values strictly
//!   below a fixed cutoff.
//! - **Quartile fence** ([`iqr_fence`], [`apply_iqr_filter`]): the box plot
//!   rule. Values outside `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]` are outliers.
//!
//! When every value sits on the same point the IQR is zero and the fence
//! collapses to `[Q1, Q3]`. The rule is applied as is: anything not equal to
//! that point is an outlier. For an all-equal series nothing is removed.

use serde::Serialize;

use crate::{StatsError, frame::Frame, percentiles::compute_percentile, series::Series};

/// Multiplier applied to the IQR to place the fences.
pub const FENCE_FACTOR: f64 = 1.5;

/// Keeps only the entries strictly less than `boundary`.
///
/// Missing entries are dropped. Kept entries retain their original index and
/// order; the input is left untouched.
///
/// # Examples
///
/// ```
/// use lendscope_stats::{outlier::remove_below_threshold, series::Series};
///
/// let series = Series::new("b", [1.0, 20000.0, 3235.0, 4.0, -1.0, 0.0, 999.0, 1000.0]);
/// let kept = remove_below_threshold(&series, 1000.0);
///
/// assert_eq!(kept.present().collect::<Vec<_>>(), vec![1.0, 4.0, -1.0, 0.0, 999.0]);
/// assert_eq!(kept.indices().collect::<Vec<_>>(), vec![0, 3, 4, 5, 6]);
/// ```
#[must_use]
pub fn remove_below_threshold(series: &Series, boundary: f64) -> Series {
    series.retain_entries(|entry| entry.value.is_some_and(|v| v < boundary))
}

/// Applies [`remove_below_threshold`] to each series with the same boundary.
#[must_use]
pub fn remove_below_threshold_all(series: &[Series], boundary: f64) -> Vec<Series> {
    series
        .iter()
        .map(|s| remove_below_threshold(s, boundary))
        .collect()
}

/// Quartiles of a series and the inclusive fence derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrFence {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFence {
    /// Builds the fence from the two quartiles.
    #[must_use]
    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            lower: q1 - FENCE_FACTOR * iqr,
            upper: q3 + FENCE_FACTOR * iqr,
        }
    }

    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whether `value` lies inside the fence, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Computes the quartile fence of the present values of `series`.
///
/// Quartiles use linear interpolation between closest ranks.
///
/// Fails with [`StatsError::EmptyInput`] if no value is present.
///
/// # Examples
///
/// ```
/// use lendscope_stats::{outlier::iqr_fence, series::Series};
///
/// let series = Series::new("x", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
/// let fence = iqr_fence(&series).unwrap();
/// assert_eq!((fence.q1, fence.q3), (3.0, 7.0));
/// assert_eq!((fence.lower, fence.upper), (-3.0, 13.0));
/// ```
pub fn iqr_fence(series: &Series) -> Result<IqrFence, StatsError> {
    let sorted = series.sorted_present();
    if sorted.is_empty() {
        return Err(StatsError::empty_input(series.name()));
    }
    Ok(IqrFence::from_quartiles(
        compute_percentile(&sorted, 25.0),
        compute_percentile(&sorted, 75.0),
    ))
}

/// Replaces values outside `fence` with missing markers. Length and indices
/// are unchanged.
#[must_use]
pub fn mask_outside_fence(series: &Series, fence: &IqrFence) -> Series {
    series.map_present(|v| fence.contains(v).then_some(v))
}

/// Nulls out-of-fence values of `column`, then drops every row with a missing
/// value in any column.
///
/// The returned frame never has more rows than `frame`.
///
/// # Errors
///
/// * [`StatsError::UnknownColumn`] if `frame` has no column named `column`
/// * [`StatsError::EmptyInput`] if the column has no present value
pub fn apply_iqr_filter(frame: &Frame, column: &str) -> Result<Frame, StatsError> {
    let series = frame.series(column)?;
    let fence = iqr_fence(&series)?;
    let masked = mask_outside_fence(&series, &fence);

    let mut filtered = frame.clone();
    filtered.set_column(column, masked.values().collect())?;
    Ok(filtered.drop_missing())
}

/// Counts of values below and above the quartile fence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub fence: IqrFence,
    /// Number of present values considered.
    pub sample_size: usize,
    pub low: usize,
    pub high: usize,
}

impl OutlierReport {
    pub fn new(series: &Series) -> Result<Self, StatsError> {
        let fence = iqr_fence(series)?;
        let (mut low, mut high, mut sample_size) = (0, 0, 0);
        for value in series.present() {
            sample_size += 1;
            if value < fence.lower {
                low += 1;
            } else if value > fence.upper {
                high += 1;
            }
        }
        Ok(Self {
            fence,
            sample_size,
            low,
            high,
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.low + self.high
    }

    /// Share of outliers among the present values, in percent.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.sample_size == 0 {
            0.0
        } else {
            100.0 * self.total() as f64 / self.sample_size as f64
        }
    }
}
