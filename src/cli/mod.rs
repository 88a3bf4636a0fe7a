pub mod dashboard;
pub mod html;
pub mod load;
pub mod report;
pub mod status;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::dataset::Dataset;
use crate::dates::parse_month;
use crate::error::{FinboardError, Result};
use crate::models::{FilterSelection, RecordKind};
use crate::settings::{load_settings, shellexpand_path, Settings};

#[derive(Parser)]
#[command(
    name = "finboard",
    about = "Payments and receipts dashboard over a chart-of-accounts workbook."
)]
pub struct Cli {
    /// Workbook (xlsx/xls/ods) or directory of CSV sheets; overrides settings for this run
    #[arg(long, global = true)]
    pub workbook: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive dashboard with filter controls (default).
    Dashboard,
    /// Print KPIs, breakdowns and transactions for one filter selection.
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        /// Emit the dashboard bundle as JSON
        #[arg(long)]
        json: bool,
        /// Show only this 1-based page of the transaction table
        #[arg(long)]
        page: Option<usize>,
    },
    /// Write the dashboard as a self-contained HTML page and open it.
    Html {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file (default: open a temporary file in the browser)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Point finboard at a workbook and remember it.
    Load {
        /// Path to the workbook or CSV directory
        path: String,
    },
    /// Show settings, workbook and dataset statistics.
    Status,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Year (default: latest year in the data)
    #[arg(long)]
    pub year: Option<i32>,
    /// Month: Jan..Dec or 1-12
    #[arg(long)]
    pub month: Option<String>,
    /// Record kind: payment or receipt
    #[arg(long)]
    pub kind: Option<String>,
    /// Supplier name (exact match)
    #[arg(long)]
    pub supplier: Option<String>,
    /// Account category (exact match)
    #[arg(long)]
    pub category: Option<String>,
}

impl FilterArgs {
    /// Resolve into a selection, defaulting the year to the dataset's latest.
    pub fn selection(&self, dataset: &Dataset) -> Result<FilterSelection> {
        let month = match self.month.as_deref() {
            Some(m) => Some(
                parse_month(m)
                    .ok_or_else(|| FinboardError::Other(format!("Invalid month: {m}")))?,
            ),
            None => None,
        };
        let kind = self
            .kind
            .as_deref()
            .map(str::parse::<RecordKind>)
            .transpose()?;
        Ok(FilterSelection {
            year: self.year.or(dataset.default_selection().year),
            month,
            kind,
            supplier: self.supplier.clone(),
            category: self.category.clone(),
        })
    }
}

/// Path of the workbook to read: the command-line override, else settings.
pub(crate) fn workbook_path(settings: &Settings, overridden: Option<&str>) -> Result<PathBuf> {
    let raw = overridden.unwrap_or(settings.workbook.as_str());
    if raw.trim().is_empty() {
        return Err(FinboardError::Settings(
            "No workbook configured. Run `finboard load <path>` or pass --workbook.".to_string(),
        ));
    }
    Ok(PathBuf::from(shellexpand_path(raw)))
}

/// Load settings and build the immutable dataset.
pub(crate) fn open_dataset(overridden: Option<&str>) -> Result<(Settings, Dataset)> {
    let settings = load_settings()?;
    let path = workbook_path(&settings, overridden)?;
    let dataset = Dataset::load(&path, &settings)?;
    Ok((settings, dataset))
}
