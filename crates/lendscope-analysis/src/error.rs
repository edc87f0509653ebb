use lendscope_stats::StatsError;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("CPI values must be finite and positive, got {from_cpi} -> {to_cpi}")]
    #[from(ignore)]
    InvalidCpi { from_cpi: f64, to_cpi: f64 },
    #[display("{_0}")]
    Stats(StatsError),
}
