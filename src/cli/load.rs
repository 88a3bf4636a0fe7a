use std::path::PathBuf;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::fmt::number;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    let mut settings = load_settings()?;

    // Only a workbook that loads cleanly is saved.
    let dataset = Dataset::load(&resolved, &settings)?;

    settings.workbook = resolved.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!(
        "Switched to {} ({} transactions)",
        resolved.display(),
        number(dataset.entries().len())
    );
    Ok(())
}
