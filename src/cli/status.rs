use crate::cli::workbook_path;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::fmt::number;
use crate::settings::{load_settings, settings_path};

pub fn run(workbook: Option<&str>) -> Result<()> {
    let settings = load_settings()?;

    println!("Settings:   {}", settings_path().display());
    let path = match workbook_path(&settings, workbook) {
        Ok(p) => p,
        Err(_) => {
            println!("Workbook:   (not set)");
            println!();
            println!("Run `finboard load <path>` to choose a workbook.");
            return Ok(());
        }
    };
    println!("Workbook:   {}", path.display());

    let dataset = Dataset::load(&path, &settings)?;
    let summary = dataset.summary();
    let years: Vec<String> = dataset
        .options()
        .years
        .iter()
        .map(|y| y.to_string())
        .collect();

    println!();
    println!("Accounts:        {}", number(summary.accounts));
    println!("Payments:        {}", number(summary.payments));
    println!("Receipts:        {}", number(summary.receipts));
    println!("Unmatched codes: {}", number(summary.unmatched));
    println!("Skipped dates:   {}", number(summary.skipped_dates));
    println!("Years:           {}", years.join(", "));
    Ok(())
}
