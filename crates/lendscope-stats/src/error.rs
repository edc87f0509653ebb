/// Errors reported by the numeric core.
///
/// Every operation in this crate is a deterministic transform, so none of
/// these are retryable; they describe bad input.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    /// Boundaries and labels do not describe a valid set of right-closed bins.
    #[display("invalid bin specification: {reason}")]
    InvalidBinSpec { reason: String },
    /// A rename mapping refers to a column the comparison table does not have.
    #[display("cannot rename '{column}': no such column in comparison table")]
    InvalidRename { column: String },
    /// The input has no usable (present, covered) values.
    #[display("'{name}' has no usable values")]
    EmptyInput { name: String },
    /// A frame column was referenced by a name the frame does not declare.
    #[display("unknown column '{column}'")]
    UnknownColumn { column: String },
    /// Two columns ended up with the same name.
    #[display("duplicate column '{column}'")]
    DuplicateColumn { column: String },
    /// A column (or index) length disagrees with the rest of the frame.
    #[display("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl StatsError {
    pub(crate) fn invalid_bin_spec(reason: impl Into<String>) -> Self {
        Self::InvalidBinSpec {
            reason: reason.into(),
        }
    }

    pub(crate) fn empty_input(name: impl Into<String>) -> Self {
        Self::EmptyInput { name: name.into() }
    }
}
