use serde::{Deserialize, Serialize};

use crate::StatsError;

/// A named, ordered sequence of optional numeric values.
///
/// Each entry remembers the positional index it had in the series it was
/// originally built from, so filters can drop entries without losing track
/// of which rows survived.
///
/// `None` is the only missing marker. `NaN` values passed to the
/// constructors are stored as `None`.
///
/// # Examples
///
/// ```
/// use lendscope_stats::series::Series;
///
/// let series = Series::from_options("income", [Some(10.0), None, Some(f64::NAN), Some(4.0)]);
/// assert_eq!(series.len(), 4);
/// assert_eq!(series.present().collect::<Vec<_>>(), vec![10.0, 4.0]);
/// assert_eq!(series.missing_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRepr", into = "SeriesRepr")]
pub struct Series {
    name: String,
    entries: Vec<SeriesEntry>,
}

/// A single entry of a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesEntry {
    /// Position of the entry in the series it was first built from.
    pub index: usize,
    /// The value, or `None` if missing.
    pub value: Option<f64>,
}

fn normalize(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

impl Series {
    /// Builds a series of present values indexed `0..n`.
    #[must_use]
    pub fn new<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_options(name, values.into_iter().map(Some))
    }

    /// Builds a series of optional values indexed `0..n`.
    #[must_use]
    pub fn from_options<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| SeriesEntry {
                index,
                value: normalize(value),
            })
            .collect();
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Builds a series from entries carrying explicit indices.
    #[must_use]
    pub fn from_entries<I>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = SeriesEntry>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| SeriesEntry {
                index: entry.index,
                value: normalize(entry.value),
            })
            .collect();
        Self {
            name: name.into(),
            entries,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    /// Iterates over the values, missing ones included.
    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.entries.iter().map(|entry| entry.value)
    }

    /// Iterates over the present values only.
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().filter_map(|entry| entry.value)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|entry| entry.index)
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_none()).count()
    }

    /// Present values sorted in ascending order.
    #[must_use]
    pub fn sorted_present(&self) -> Vec<f64> {
        let mut values = self.present().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        values
    }

    /// Keeps the entries for which `pred` returns `true`, indices untouched.
    #[must_use]
    pub fn retain_entries<F>(&self, mut pred: F) -> Self
    where
        F: FnMut(&SeriesEntry) -> bool,
    {
        Self {
            name: self.name.clone(),
            entries: self.entries.iter().filter(|e| pred(e)).copied().collect(),
        }
    }

    /// Rewrites every present value, keeping length and indices.
    ///
    /// Returning `None` (or `NaN`) from `f` marks the entry missing.
    #[must_use]
    pub fn map_present<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64) -> Option<f64>,
    {
        Self {
            name: self.name.clone(),
            entries: self
                .entries
                .iter()
                .map(|entry| SeriesEntry {
                    index: entry.index,
                    value: normalize(entry.value.and_then(&mut f)),
                })
                .collect(),
        }
    }
}

/// JSON form of a series: `{"name": "...", "values": [1.0, null], "index": [0, 3]}`.
///
/// `index` is optional and defaults to `0..values.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeriesRepr {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<Vec<usize>>,
    values: Vec<Option<f64>>,
}

impl TryFrom<SeriesRepr> for Series {
    type Error = StatsError;

    fn try_from(repr: SeriesRepr) -> Result<Self, Self::Error> {
        let Some(index) = repr.index else {
            return Ok(Self::from_options(repr.name, repr.values));
        };
        if index.len() != repr.values.len() {
            return Err(StatsError::ColumnLengthMismatch {
                column: format!("{} (index)", repr.name),
                expected: repr.values.len(),
                actual: index.len(),
            });
        }
        let entries = index
            .into_iter()
            .zip(repr.values)
            .map(|(index, value)| SeriesEntry { index, value });
        Ok(Self::from_entries(repr.name, entries))
    }
}

impl From<Series> for SeriesRepr {
    fn from(series: Series) -> Self {
        let (index, values) = series
            .entries
            .iter()
            .map(|entry| (entry.index, entry.value))
            .unzip();
        Self {
            name: series.name,
            index: Some(index),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_missing() {
        let series = Series::new("x", [1.0, f64::NAN, 3.0]);
        assert_eq!(series.values().collect::<Vec<_>>(), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(series.missing_count(), 1);
    }

    #[test]
    fn test_retain_keeps_indices() {
        let series = Series::new("x", [5.0, 1.0, 7.0, 2.0]);
        let kept = series.retain_entries(|e| e.value.is_some_and(|v| v < 5.0));
        assert_eq!(kept.indices().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(kept.name(), "x");
        // input untouched
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn test_sorted_present_skips_missing() {
        let series = Series::from_options("x", [Some(3.0), None, Some(-1.0), Some(2.0)]);
        assert_eq!(series.sorted_present(), vec![-1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_json_without_index() {
        let series: Series =
            serde_json::from_str(r#"{"name": "income", "values": [1.5, null, 3]}"#).unwrap();
        assert_eq!(series.name(), "income");
        assert_eq!(series.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(series.values().collect::<Vec<_>>(), vec![Some(1.5), None, Some(3.0)]);
    }

    #[test]
    fn test_json_with_index() {
        let series: Series =
            serde_json::from_str(r#"{"name": "a", "index": [4, 9], "values": [1, 2]}"#).unwrap();
        assert_eq!(series.indices().collect::<Vec<_>>(), vec![4, 9]);

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["index"], serde_json::json!([4, 9]));
    }

    #[test]
    fn test_json_index_length_mismatch() {
        let result = serde_json::from_str::<Series>(r#"{"name": "a", "index": [4], "values": [1, 2]}"#);
        assert!(result.is_err());
    }
}
