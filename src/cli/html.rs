use std::path::PathBuf;

use crate::cli::{open_dataset, FilterArgs};
use crate::error::{FinboardError, Result};
use crate::html;

pub fn run(workbook: Option<&str>, filters: &FilterArgs, output: Option<PathBuf>) -> Result<()> {
    let (settings, dataset) = open_dataset(workbook)?;
    let selection = filters.selection(&dataset)?;
    let view = dataset.recompute(&selection, &settings.format);
    let page = html::generate(&view, &selection, &settings.format, settings.page_size);

    if let Some(path) = output {
        std::fs::write(&path, &page)?;
        println!("Dashboard written to {}", path.display());
    } else {
        let path = std::env::temp_dir().join("finboard-dashboard.html");
        std::fs::write(&path, &page)?;
        opener::open(&path)
            .map_err(|e| FinboardError::Other(format!("Could not open browser: {e}")))?;
        println!("Opened dashboard in browser: {}", path.display());
    }
    Ok(())
}
