//! Numeric core for the lendscope loan/household comparison.
//!
//! This crate provides the small set of statistical transforms the analysis
//! is built on:
//!
//! - **Series and frames**: named numeric data with an explicit missing marker
//! - **Percentiles**: linear-interpolation quantiles
//! - **Descriptive statistics**: five-number summary, mean and dispersion
//! - **Bucketing**: right-closed labeled bins and per-bucket shares
//! - **Outlier removal**: hard thresholds and the quartile (IQR) fence
//!
//! # Modules
//!
//! - [`series`]: [`Series`](series::Series), an indexed sequence of `Option<f64>`
//! - [`frame`]: [`Frame`](frame::Frame), named columns sharing a row index
//! - [`percentiles`]: Percentile computation and storage
//! - [`descriptive`]: Descriptive statistics for summarizing series
//! - [`bucket`]: Bucketizer and comparison tables
//! - [`outlier`]: Threshold and IQR-fence filters
//!
//! # Examples
//!
//! ## Comparing bucket shares across sources
//!
//! ```
//! use std::collections::BTreeMap;
//! use lendscope_stats::{bucket::{BinSpec, compare_series}, series::Series};
//!
//! let spec = BinSpec::new([0.0, 10.0, 20.0, f64::INFINITY], ["low", "mid", "high"]).unwrap();
//! let club = Series::new("club", [5.0, 15.0, 25.0, 8.0]);
//! let survey = Series::from_options("survey", [Some(12.0), None, Some(30.0)]);
//!
//! let table = compare_series(&[club, survey], &spec, &BTreeMap::new()).unwrap();
//! assert_eq!(table.get("low", "club"), Some(0.5));
//! assert_eq!(table.get("low", "survey"), Some(0.0));
//! ```
//!
//! ## Removing outliers
//!
//! ```
//! use lendscope_stats::{frame::Frame, outlier::apply_iqr_filter};
//!
//! let frame = Frame::new([
//!     ("dti", vec![Some(10.0), Some(11.0), Some(12.0), Some(13.0), Some(900.0)]),
//! ])
//! .unwrap();
//! let filtered = apply_iqr_filter(&frame, "dti").unwrap();
//! assert_eq!(filtered.num_rows(), 4);
//! ```

pub use self::error::StatsError;

pub mod bucket;
pub mod descriptive;
mod error;
pub mod frame;
pub mod outlier;
pub mod percentiles;
pub mod series;
