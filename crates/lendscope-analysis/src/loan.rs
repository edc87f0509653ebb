//! Peer-to-peer loan records and outcome categories
//!
//! Loans are tagged by the outcome their status implies:
//!
//! | category | statuses |
//! | --- | --- |
//! | Good | `Fully Paid` |
//! | Bad | `Charged Off`, `Late (31-120 days)` |
//! | Current | `Current`, `In Grace Period`, `Late (16-30 days)` |
//!
//! Good and Bad loans are *finished*: their outcome is known. Records with
//! any other status carry no category and are left out of categorized sets.

use std::{collections::BTreeMap, convert::Infallible, str::FromStr};

use lendscope_stats::{
    StatsError,
    frame::{Column, Frame},
    series::Series,
};
use serde::{Deserialize, Serialize};

/// Loan status as reported by the lending platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(from = "String", into = "String")]
pub enum LoanStatus {
    #[display("Fully Paid")]
    FullyPaid,
    #[display("Charged Off")]
    ChargedOff,
    #[display("Late (31-120 days)")]
    LateLong,
    #[display("Current")]
    Current,
    #[display("In Grace Period")]
    InGracePeriod,
    #[display("Late (16-30 days)")]
    LateShort,
    #[display("{_0}")]
    Other(String),
}

impl LoanStatus {
    #[must_use]
    pub fn category(&self) -> Option<LoanCategory> {
        match self {
            Self::FullyPaid => Some(LoanCategory::Good),
            Self::ChargedOff | Self::LateLong => Some(LoanCategory::Bad),
            Self::Current | Self::InGracePeriod | Self::LateShort => Some(LoanCategory::Current),
            Self::Other(_) => None,
        }
    }
}

// Unlisted statuses are kept verbatim, so parsing never fails.
impl FromStr for LoanStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Fully Paid" => Self::FullyPaid,
            "Charged Off" => Self::ChargedOff,
            "Late (31-120 days)" => Self::LateLong,
            "Current" => Self::Current,
            "In Grace Period" => Self::InGracePeriod,
            "Late (16-30 days)" => Self::LateShort,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for LoanStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<LoanStatus> for String {
    fn from(status: LoanStatus) -> Self {
        status.to_string()
    }
}

/// Outcome category of a loan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum LoanCategory {
    #[display("Good Loans")]
    #[serde(rename = "Good Loans")]
    Good,
    #[display("Bad Loans")]
    #[serde(rename = "Bad Loans")]
    Bad,
    #[display("Current Loans")]
    #[serde(rename = "Current Loans")]
    Current,
}

impl LoanCategory {
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Good | Self::Bad)
    }
}

/// One loan from the lending platform's public loan data.
///
/// Only the fields the analysis reads are kept; unknown JSON fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_status: LoanStatus,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub sub_grade: Option<String>,
    #[serde(default)]
    pub emp_length: Option<f64>,
    #[serde(default)]
    pub annual_income: Option<f64>,
    #[serde(default)]
    pub debt_to_income: Option<f64>,
    #[serde(default)]
    pub loan_amount: Option<f64>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
}

/// Numeric fields of [`LoanRecord`] addressable as frame columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanField {
    EmpLength,
    AnnualIncome,
    DebtToIncome,
    LoanAmount,
    InterestRate,
}

impl LoanField {
    pub const ALL: [Self; 5] = [
        Self::EmpLength,
        Self::AnnualIncome,
        Self::DebtToIncome,
        Self::LoanAmount,
        Self::InterestRate,
    ];

    #[must_use]
    pub fn column_name(self) -> &'static str {
        match self {
            Self::EmpLength => "emp_length",
            Self::AnnualIncome => "annual_income",
            Self::DebtToIncome => "debt_to_income",
            Self::LoanAmount => "loan_amount",
            Self::InterestRate => "interest_rate",
        }
    }

    /// Looks a field up by its column name.
    pub fn from_column(name: &str) -> Result<Self, StatsError> {
        Self::ALL
            .into_iter()
            .find(|field| field.column_name() == name)
            .ok_or_else(|| StatsError::UnknownColumn {
                column: name.to_owned(),
            })
    }

    #[must_use]
    pub fn get(self, record: &LoanRecord) -> Option<f64> {
        match self {
            Self::EmpLength => record.emp_length,
            Self::AnnualIncome => record.annual_income,
            Self::DebtToIncome => record.debt_to_income,
            Self::LoanAmount => record.loan_amount,
            Self::InterestRate => record.interest_rate,
        }
    }
}

/// A loan tagged with its outcome category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedLoan {
    pub category: LoanCategory,
    #[serde(flatten)]
    pub record: LoanRecord,
}

/// Result of [`categorize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorizedLoans {
    /// Good, then Bad, then Current loans.
    pub all: Vec<CategorizedLoan>,
    /// Good, then Bad loans.
    pub finished: Vec<CategorizedLoan>,
}

impl CategorizedLoans {
    /// Number of loans per category in [`Self::all`].
    #[must_use]
    pub fn counts(&self) -> BTreeMap<LoanCategory, usize> {
        let mut counts = BTreeMap::new();
        for loan in &self.all {
            *counts.entry(loan.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Tags loans by outcome category.
///
/// Records keep their relative order inside each category. Loans whose status
/// maps to no category are dropped.
///
/// # Examples
///
/// ```
/// use lendscope_analysis::loan::{LoanCategory, LoanRecord, categorize};
///
/// let loans: Vec<LoanRecord> = serde_json::from_str(r#"[
///     {"loan_status": "Current"},
///     {"loan_status": "Charged Off"},
///     {"loan_status": "Fully Paid"},
///     {"loan_status": "Does not meet the credit policy"}
/// ]"#).unwrap();
///
/// let categorized = categorize(&loans);
/// let order = categorized.all.iter().map(|l| l.category).collect::<Vec<_>>();
/// assert_eq!(order, [LoanCategory::Good, LoanCategory::Bad, LoanCategory::Current]);
/// assert_eq!(categorized.finished.len(), 2);
/// ```
#[must_use]
pub fn categorize(loans: &[LoanRecord]) -> CategorizedLoans {
    let tagged = |wanted: LoanCategory| {
        loans
            .iter()
            .filter(move |loan| loan.loan_status.category() == Some(wanted))
            .map(move |loan| CategorizedLoan {
                category: wanted,
                record: loan.clone(),
            })
    };

    let finished = tagged(LoanCategory::Good)
        .chain(tagged(LoanCategory::Bad))
        .collect::<Vec<_>>();
    let mut all = finished.clone();
    all.extend(tagged(LoanCategory::Current));

    tracing::debug!(
        total = loans.len(),
        categorized = all.len(),
        finished = finished.len(),
        "categorized loans"
    );

    CategorizedLoans { all, finished }
}

/// Projects numeric fields of `loans` into a frame indexed by record position.
pub fn loans_frame<'a, I>(loans: I, fields: &[LoanField]) -> Result<Frame, StatsError>
where
    I: IntoIterator<Item = &'a LoanRecord>,
{
    let loans = loans.into_iter().collect::<Vec<_>>();
    let columns = fields
        .iter()
        .map(|&field| Column {
            name: field.column_name().to_owned(),
            values: loans.iter().map(|loan| field.get(loan)).collect(),
        })
        .collect();
    Frame::with_index((0..loans.len()).collect(), columns)
}

/// Extracts one numeric field of `loans` as a named series.
#[must_use]
pub fn loan_series<'a, I>(name: &str, loans: I, field: LoanField) -> Series
where
    I: IntoIterator<Item = &'a LoanRecord>,
{
    Series::from_options(name, loans.into_iter().map(|loan| field.get(loan)))
}
