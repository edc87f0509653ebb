use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{
    bucketize::BucketizeArg, compare::CompareArg, describe::DescribeArg,
    households::HouseholdsArg, iqr_filter::IqrFilterArg, loans::LoansArg, trim::TrimArg,
};

mod bucketize;
mod compare;
mod describe;
mod households;
mod iqr_filter;
mod loans;
mod trim;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug output to stderr (`RUST_LOG` takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Split a series into labeled buckets and report each bucket's share
    Bucketize(#[clap(flatten)] BucketizeArg),
    /// Compare bucket shares of several series side by side
    Compare(#[clap(flatten)] CompareArg),
    /// Drop values at or above a cutoff
    Trim(#[clap(flatten)] TrimArg),
    /// Remove rows whose column value falls outside the quartile fence
    IqrFilter(#[clap(flatten)] IqrFilterArg),
    /// Print summary statistics and outlier counts
    Describe(#[clap(flatten)] DescribeArg),
    /// Categorize loans by outcome
    Loans(#[clap(flatten)] LoansArg),
    /// Aggregate household survey rows per case
    Households(#[clap(flatten)] HouseholdsArg),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr; stdout carries reports and JSON.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);

    match args.mode {
        Mode::Bucketize(arg) => bucketize::run(arg)?,
        Mode::Compare(arg) => compare::run(arg)?,
        Mode::Trim(arg) => trim::run(arg)?,
        Mode::IqrFilter(arg) => iqr_filter::run(arg)?,
        Mode::Describe(arg) => describe::run(arg)?,
        Mode::Loans(arg) => loans::run(arg)?,
        Mode::Households(arg) => households::run(arg)?,
    }
    Ok(())
}
