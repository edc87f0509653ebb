//! Household survey records (Survey of Consumer Finances summary extract)
//!
//! The survey stores several imputed rows per household, all sharing the case
//! id `YY1`. [`group_by_case`] collapses them into one [`CaseSummary`] per
//! household by averaging. Monetary amounts can then be moved to another
//! year's price level with a [`CpiAdjustment`].

use std::collections::BTreeMap;

use lendscope_stats::series::{Series, SeriesEntry};
use serde::{Deserialize, Deserializer, Serialize};

use crate::AnalysisError;

/// One row of the survey extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdRecord {
    #[serde(rename = "YY1")]
    pub case_id: u32,
    #[serde(rename = "INCOME")]
    pub income: f64,
    #[serde(rename = "DEBT")]
    pub debt: f64,
    #[serde(rename = "DEBT2INC")]
    pub debt_to_income: f64,
    /// `HDEBT`: whether the household has any debt. Accepts `0`/`1` or booleans.
    #[serde(rename = "HDEBT", default, deserialize_with = "deserialize_flag")]
    pub has_debt: bool,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "HDEBT must be 0 or 1, got {other}"
        ))),
    }
}

/// Keeps only households that have debt.
#[must_use]
pub fn filter_debtors(records: &[HouseholdRecord]) -> Vec<HouseholdRecord> {
    records.iter().filter(|r| r.has_debt).cloned().collect()
}

/// Per-household means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub income: f64,
    pub debt: f64,
    pub debt_to_income: f64,
    /// Number of survey rows averaged into this summary.
    pub rows: usize,
}

impl CaseSummary {
    /// Moves income and debt to the target price level. The debt-to-income
    /// ratio is unitless and kept as is.
    #[must_use]
    pub fn deflated(&self, adjustment: &CpiAdjustment) -> Self {
        Self {
            income: adjustment.deflate(self.income),
            debt: adjustment.deflate(self.debt),
            ..*self
        }
    }
}

/// Averages income, debt and debt-to-income per case id.
///
/// # Examples
///
/// ```
/// use lendscope_analysis::household::{HouseholdRecord, group_by_case};
///
/// let records: Vec<HouseholdRecord> = serde_json::from_str(r#"[
///     {"YY1": 1, "INCOME": 20, "DEBT": 10, "DEBT2INC": 2},
///     {"YY1": 1, "INCOME": 30, "DEBT": 10, "DEBT2INC": 3},
///     {"YY1": 1, "INCOME": 40, "DEBT": 20, "DEBT2INC": 2},
///     {"YY1": 2, "INCOME": 50, "DEBT": 30, "DEBT2INC": 1.6666666666666667},
///     {"YY1": 3, "INCOME": 60, "DEBT": 10, "DEBT2INC": 6}
/// ]"#).unwrap();
///
/// let cases = group_by_case(&records);
/// assert_eq!(cases[&1].income, 30.0);
/// assert_eq!(cases[&2].income, 50.0);
/// assert_eq!(cases[&3].income, 60.0);
/// assert_eq!(cases[&3].debt, 10.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn group_by_case(records: &[HouseholdRecord]) -> BTreeMap<u32, CaseSummary> {
    let mut sums = BTreeMap::<u32, CaseSummary>::new();
    for record in records {
        let sum = sums.entry(record.case_id).or_insert(CaseSummary {
            income: 0.0,
            debt: 0.0,
            debt_to_income: 0.0,
            rows: 0,
        });
        sum.income += record.income;
        sum.debt += record.debt;
        sum.debt_to_income += record.debt_to_income;
        sum.rows += 1;
    }

    for sum in sums.values_mut() {
        let n = sum.rows as f64;
        sum.income /= n;
        sum.debt /= n;
        sum.debt_to_income /= n;
    }
    sums
}

/// Ratio of two consumer price index levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpiAdjustment {
    /// CPI of the year the amounts are expressed in.
    pub from_cpi: f64,
    /// CPI of the year to express them in.
    pub to_cpi: f64,
}

impl CpiAdjustment {
    /// Annual average CPI-U, 2019 to 2010.
    pub const SCF_2019_TO_2010: Self = Self {
        from_cpi: 255.7,
        to_cpi: 218.1,
    };

    pub fn new(from_cpi: f64, to_cpi: f64) -> Result<Self, AnalysisError> {
        let valid = |cpi: f64| cpi.is_finite() && cpi > 0.0;
        if !valid(from_cpi) || !valid(to_cpi) {
            return Err(AnalysisError::InvalidCpi { from_cpi, to_cpi });
        }
        Ok(Self { from_cpi, to_cpi })
    }

    /// Inflation between the two price levels, `from_cpi / to_cpi`.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.from_cpi / self.to_cpi
    }

    /// Expresses `amount` at the target price level.
    ///
    /// ```
    /// # use lendscope_analysis::household::CpiAdjustment;
    /// let income = CpiAdjustment::SCF_2019_TO_2010.deflate(100.0);
    /// assert!((income - 85.295268).abs() < 1e-6);
    /// ```
    #[must_use]
    pub fn deflate(&self, amount: f64) -> f64 {
        amount / self.rate()
    }
}

/// Numeric columns of [`CaseSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseField {
    Income,
    Debt,
    DebtToIncome,
}

impl CaseField {
    #[must_use]
    pub fn get(self, summary: &CaseSummary) -> f64 {
        match self {
            Self::Income => summary.income,
            Self::Debt => summary.debt,
            Self::DebtToIncome => summary.debt_to_income,
        }
    }
}

/// Extracts one field of the case summaries as a series indexed by case id.
#[must_use]
pub fn case_series(name: &str, cases: &BTreeMap<u32, CaseSummary>, field: CaseField) -> Series {
    let entries = cases.iter().map(|(&case_id, summary)| SeriesEntry {
        index: case_id as usize,
        value: Some(field.get(summary)),
    });
    Series::from_entries(name, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(case_id: u32, income: f64, debt: f64, has_debt: bool) -> HouseholdRecord {
        HouseholdRecord {
            case_id,
            income,
            debt,
            debt_to_income: if income == 0.0 { 0.0 } else { debt / income },
            has_debt,
        }
    }

    #[test]
    fn test_filter_debtors() {
        let records = [
            record(1, 10.0, 5.0, true),
            record(2, 10.0, 0.0, false),
            record(3, 10.0, 1.0, true),
        ];
        let debtors = filter_debtors(&records);
        assert_eq!(debtors.iter().map(|r| r.case_id).collect::<Vec<_>>(), [1, 3]);
    }

    #[test]
    fn test_flag_formats() {
        let parse = |json: &str| serde_json::from_str::<HouseholdRecord>(json);
        let base = r#""YY1": 1, "INCOME": 1, "DEBT": 0, "DEBT2INC": 0"#;
        assert!(parse(&format!("{{{base}, \"HDEBT\": 1}}")).unwrap().has_debt);
        assert!(!parse(&format!("{{{base}, \"HDEBT\": 0}}")).unwrap().has_debt);
        assert!(parse(&format!("{{{base}, \"HDEBT\": true}}")).unwrap().has_debt);
        assert!(!parse(&format!("{{{base}}}")).unwrap().has_debt);
        assert!(parse(&format!("{{{base}, \"HDEBT\": 2}}")).is_err());
    }

    #[test]
    fn test_group_counts_rows() {
        let records = [
            record(7, 10.0, 1.0, true),
            record(7, 20.0, 3.0, true),
            record(2, 5.0, 0.0, false),
        ];
        let cases = group_by_case(&records);
        assert_eq!(cases.keys().copied().collect::<Vec<_>>(), [2, 7]);
        assert_eq!(cases[&7].rows, 2);
        assert_eq!(cases[&7].income, 15.0);
        assert_eq!(cases[&7].debt, 2.0);
    }

    #[test]
    fn test_deflate_amounts() {
        let adjustment = CpiAdjustment::SCF_2019_TO_2010;
        let close = |a: f64, b: f64| (a - b).abs() < 1e-6;
        assert!(close(adjustment.deflate(200.0), 170.590_536));
        assert!(close(adjustment.deflate(1450.0), 1_236.781_384));
        assert!(close(adjustment.deflate(20.0), 17.059_054));
        assert!(close(adjustment.deflate(8872.0), 7_567.396_167));

        let summary = CaseSummary {
            income: 100.0,
            debt: 1402.0,
            debt_to_income: 0.5,
            rows: 5,
        };
        let deflated = summary.deflated(&adjustment);
        assert!(close(deflated.income, 85.295_268));
        assert!(close(deflated.debt, 1_195.839_656));
        assert_eq!(deflated.debt_to_income, 0.5);
        assert_eq!(deflated.rows, 5);
    }

    #[test]
    fn test_invalid_cpi() {
        assert!(CpiAdjustment::new(0.0, 218.1).is_err());
        assert!(CpiAdjustment::new(255.7, f64::NAN).is_err());
        assert_eq!(
            CpiAdjustment::new(255.7, 218.1).unwrap(),
            CpiAdjustment::SCF_2019_TO_2010
        );
    }

    #[test]
    fn test_case_series_uses_case_ids() {
        let cases = group_by_case(&[record(4, 10.0, 1.0, true), record(9, 30.0, 3.0, true)]);
        let series = case_series("scf_2019", &cases, CaseField::Income);
        assert_eq!(series.indices().collect::<Vec<_>>(), [4, 9]);
        assert_eq!(series.present().collect::<Vec<_>>(), [10.0, 30.0]);
    }
}
