use std::{collections::BTreeMap, path::PathBuf};

use clap::Args;
use lendscope_analysis::household::{
    self, CaseField, CaseSummary, CpiAdjustment, HouseholdRecord,
};
use serde::Serialize;

use crate::util::{self, Output};

/// Field exported with `--series`
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum SeriesField {
    Income,
    Debt,
    DebtToIncome,
}

impl From<SeriesField> for CaseField {
    fn from(field: SeriesField) -> Self {
        match field {
            SeriesField::Income => CaseField::Income,
            SeriesField::Debt => CaseField::Debt,
            SeriesField::DebtToIncome => CaseField::DebtToIncome,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct HouseholdsArg {
    /// Path to the household records JSON file (array of records)
    pub records: PathBuf,

    /// Keep only households with debt (HDEBT = 1)
    #[arg(long)]
    pub debtors_only: bool,

    /// Express income and debt at the target CPI level
    #[arg(long)]
    pub deflate: bool,

    /// CPI of the year the amounts are expressed in
    #[arg(long, default_value_t = CpiAdjustment::SCF_2019_TO_2010.from_cpi)]
    pub from_cpi: f64,

    /// CPI of the target year
    #[arg(long, default_value_t = CpiAdjustment::SCF_2019_TO_2010.to_cpi)]
    pub to_cpi: f64,

    /// Export one field as a series (income, debt, debttoincome) instead of case summaries
    #[arg(long)]
    pub series: Option<SeriesField>,

    /// Name of the exported series (default: the records file stem)
    #[arg(long)]
    pub series_name: Option<String>,

    /// Output file path (default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CaseReport {
    nominal: CaseSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    deflated: Option<CaseSummary>,
}

pub(crate) fn run(arg: HouseholdsArg) -> anyhow::Result<()> {
    let adjustment = arg
        .deflate
        .then(|| CpiAdjustment::new(arg.from_cpi, arg.to_cpi))
        .transpose()?;

    let mut records: Vec<HouseholdRecord> = util::read_json_file("household", &arg.records)?;
    let total = records.len();
    if arg.debtors_only {
        records = household::filter_debtors(&records);
    }
    let cases = household::group_by_case(&records);
    tracing::info!(
        rows = total,
        kept = records.len(),
        cases = cases.len(),
        "aggregated households"
    );

    if let Some(field) = arg.series {
        let cases = match &adjustment {
            Some(adjustment) => cases
                .iter()
                .map(|(&id, summary)| (id, summary.deflated(adjustment)))
                .collect(),
            None => cases,
        };
        let name = arg.series_name.unwrap_or_else(|| {
            arg.records
                .file_stem()
                .map_or_else(|| "households".to_owned(), |s| s.to_string_lossy().into_owned())
        });
        let series = household::case_series(&name, &cases, field.into());
        return Output::save_json(&series, arg.output);
    }

    let reports = cases
        .iter()
        .map(|(&id, summary)| {
            let report = CaseReport {
                nominal: *summary,
                deflated: adjustment.as_ref().map(|adj| summary.deflated(adj)),
            };
            (id, report)
        })
        .collect::<BTreeMap<_, _>>();
    Output::save_json(&reports, arg.output)
}
