use serde::{Deserialize, Serialize};

use crate::{
    StatsError,
    series::{Series, SeriesEntry},
};

/// A table of named numeric columns sharing one row index.
///
/// Column names are unique and fixed when the frame is built; looking up any
/// other name fails with [`StatsError::UnknownColumn`]. Row indices are the
/// positions rows had when first loaded and survive row filtering.
///
/// # Examples
///
/// ```
/// use lendscope_stats::frame::Frame;
///
/// let frame = Frame::new([
///     ("debt_to_income", vec![Some(18.0), None, Some(5.0)]),
///     ("emp_length", vec![Some(3.0), Some(10.0), Some(1.0)]),
/// ])
/// .unwrap();
///
/// let complete = frame.drop_missing();
/// assert_eq!(complete.num_rows(), 2);
/// assert_eq!(complete.index(), [0, 2]);
/// assert!(frame.column("grade").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameRepr", into = "FrameRepr")]
pub struct Frame {
    index: Vec<usize>,
    columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Frame {
    /// Builds a frame indexed `0..n` from `(name, values)` pairs.
    ///
    /// `NaN` values are stored as missing.
    pub fn new<I, S>(columns: I) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, values)| Column {
                name: name.into(),
                values,
            })
            .collect::<Vec<_>>();
        let rows = columns.first().map_or(0, |c| c.values.len());
        Self::with_index((0..rows).collect(), columns)
    }

    /// Builds a frame with an explicit row index.
    ///
    /// `NaN` values are stored as missing.
    pub fn with_index(index: Vec<usize>, mut columns: Vec<Column>) -> Result<Self, StatsError> {
        let rows = index.len();
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(StatsError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
            if column.values.len() != rows {
                return Err(StatsError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: rows,
                    actual: column.values.len(),
                });
            }
        }
        for column in &mut columns {
            normalize_missing(&mut column.values);
        }
        Ok(Self { index, columns })
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    fn position(&self, name: &str) -> Result<usize, StatsError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| StatsError::UnknownColumn {
                column: name.to_owned(),
            })
    }

    pub fn column(&self, name: &str) -> Result<&[Option<f64>], StatsError> {
        let pos = self.position(name)?;
        Ok(&self.columns[pos].values)
    }

    /// Returns a column as a [`Series`] carrying the frame's row index.
    pub fn series(&self, name: &str) -> Result<Series, StatsError> {
        let values = self.column(name)?;
        let entries = self
            .index
            .iter()
            .zip(values)
            .map(|(&index, &value)| SeriesEntry { index, value });
        Ok(Series::from_entries(name, entries))
    }

    /// Replaces the values of an existing column, row for row.
    pub fn set_column(&mut self, name: &str, mut values: Vec<Option<f64>>) -> Result<(), StatsError> {
        let pos = self.position(name)?;
        if values.len() != self.num_rows() {
            return Err(StatsError::ColumnLengthMismatch {
                column: name.to_owned(),
                expected: self.num_rows(),
                actual: values.len(),
            });
        }
        normalize_missing(&mut values);
        self.columns[pos].values = values;
        Ok(())
    }

    /// Keeps only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self, StatsError> {
        let columns = names
            .iter()
            .map(|name| {
                let pos = self.position(name)?;
                Ok(self.columns[pos].clone())
            })
            .collect::<Result<Vec<_>, StatsError>>()?;
        Self::with_index(self.index.clone(), columns)
    }

    /// Keeps the rows for which `keep(row)` is `true`.
    #[must_use]
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        let rows = (0..self.num_rows()).filter(|&row| keep(row)).collect::<Vec<_>>();
        let index = rows.iter().map(|&row| self.index[row]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: rows.iter().map(|&row| c.values[row]).collect(),
            })
            .collect();
        Self { index, columns }
    }

    /// Drops every row that has a missing value in any column.
    #[must_use]
    pub fn drop_missing(&self) -> Self {
        self.filter_rows(|row| self.columns.iter().all(|c| c.values[row].is_some()))
    }
}

fn normalize_missing(values: &mut [Option<f64>]) {
    for value in values {
        if value.is_some_and(f64::is_nan) {
            *value = None;
        }
    }
}

/// JSON form of a frame: `{"index": [...], "columns": [{"name": ..., "values": [...]}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<Vec<usize>>,
    columns: Vec<Column>,
}

impl TryFrom<FrameRepr> for Frame {
    type Error = StatsError;

    fn try_from(repr: FrameRepr) -> Result<Self, Self::Error> {
        match repr.index {
            Some(index) => Self::with_index(index, repr.columns),
            None => Self::new(repr.columns.into_iter().map(|c| (c.name, c.values))),
        }
    }
}

impl From<Frame> for FrameRepr {
    fn from(frame: Frame) -> Self {
        Self {
            index: Some(frame.index),
            columns: frame.columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::new([
            ("a", vec![Some(1.0), Some(2.0), None, Some(4.0)]),
            ("b", vec![Some(9.0), None, Some(7.0), Some(6.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_and_ragged_columns() {
        let dup = Frame::new([("a", vec![Some(1.0)]), ("a", vec![Some(2.0)])]);
        assert_eq!(dup.unwrap_err(), StatsError::DuplicateColumn { column: "a".into() });

        let ragged = Frame::new([("a", vec![Some(1.0)]), ("b", vec![])]);
        assert!(matches!(
            ragged,
            Err(StatsError::ColumnLengthMismatch { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_series_keeps_index() {
        let frame = sample().drop_missing();
        let series = frame.series("b").unwrap();
        assert_eq!(series.indices().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(series.present().collect::<Vec<_>>(), vec![9.0, 6.0]);
    }

    #[test]
    fn test_select_unknown_column() {
        let err = sample().select(&["a", "c"]).unwrap_err();
        assert_eq!(err, StatsError::UnknownColumn { column: "c".into() });
        let selected = sample().select(&["b"]).unwrap();
        assert_eq!(selected.column_names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_set_column_length() {
        let mut frame = sample();
        assert!(frame.set_column("a", vec![None]).is_err());
        frame.set_column("a", vec![None, None, None, Some(f64::NAN)]).unwrap();
        assert!(frame.column("a").unwrap().iter().all(Option::is_none));
        assert_eq!(frame.drop_missing().num_rows(), 0);
    }

    #[test]
    fn test_with_index_treats_nan_as_missing() {
        let columns = vec![Column {
            name: "a".into(),
            values: vec![Some(f64::NAN), Some(1.0)],
        }];
        let frame = Frame::with_index(vec![10, 11], columns).unwrap();
        assert_eq!(frame.column("a").unwrap(), [None, Some(1.0)]);

        let complete = frame.drop_missing();
        assert_eq!(complete.num_rows(), 1);
        assert_eq!(complete.index(), [11]);
    }

    #[test]
    fn test_json_round_trip_keeps_index() {
        let frame = sample().drop_missing();
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
