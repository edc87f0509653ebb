//! Loan and household analysis built on `lendscope-stats`
//!
//! This crate holds the domain side of the comparison between
//! peer-to-peer loan borrowers and general-population households.
//!
//! # Overview
//!
//! ## Loan Workflow
//!
//! 1. **Load Records** ([`loan::LoanRecord`]): Deserialize the platform's loan data
//! 2. **Categorize** ([`loan::categorize`]): Tag Good / Bad / Current loans and
//!    extract the finished subset
//! 3. **Project** ([`loan::loans_frame`]): Select numeric columns into a
//!    [`Frame`](lendscope_stats::frame::Frame) for outlier filtering
//!
//! ## Household Workflow
//!
//! 1. **Load Records** ([`household::HouseholdRecord`]): Survey rows keyed by case id
//! 2. **Filter** ([`household::filter_debtors`]): Keep households with debt
//! 3. **Aggregate** ([`household::group_by_case`]): Average rows per household
//! 4. **De-inflate** ([`household::CpiAdjustment`]): Move amounts to a common price level
//!
//! ## Comparison Workflow
//!
//! [`comparison::run_comparison`] trims each source, splits it into the
//! configured buckets and lines the shares up in one table.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use lendscope_analysis::{
//!     comparison::{ComparisonConfig, run_comparison},
//!     household::{CaseField, CpiAdjustment, HouseholdRecord, case_series, group_by_case},
//! };
//! use lendscope_stats::bucket::BinSpec;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let records: Vec<HouseholdRecord> = serde_json::from_str(r#"[
//!     {"YY1": 1, "INCOME": 40000, "DEBT": 1000, "DEBT2INC": 0.025, "HDEBT": 1},
//!     {"YY1": 2, "INCOME": 90000, "DEBT": 0, "DEBT2INC": 0, "HDEBT": 0}
//! ]"#)?;
//!
//! let adjustment = CpiAdjustment::SCF_2019_TO_2010;
//! let cases = group_by_case(&records)
//!     .into_iter()
//!     .map(|(id, summary)| (id, summary.deflated(&adjustment)))
//!     .collect::<BTreeMap<_, _>>();
//!
//! let config = ComparisonConfig {
//!     bins: BinSpec::new([0.0, 50_000.0, f64::INFINITY], ["<50k", ">=50k"])?,
//!     rename: BTreeMap::new(),
//!     below: None,
//! };
//! let income = case_series("scf_2019", &cases, CaseField::Income);
//! let table = run_comparison(&config, &[income])?;
//! assert_eq!(table.get("<50k", "scf_2019"), Some(0.5));
//! # Ok(())
//! # }
//! ```

pub use self::error::AnalysisError;

pub mod comparison;
mod error;
pub mod household;
pub mod loan;
