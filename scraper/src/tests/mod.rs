use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub mod fixtures;
pub mod report_tests;

/// Save a search page that failed to parse, with the location it was
/// searched for, so the regression test can replay it.
pub fn save_failed_html(html: &str, test_name: &str, location: &str) -> Result<PathBuf> {
    let failures_dir = Path::new("src/tests/fixtures/failures");
    fs::create_dir_all(failures_dir)?;

    let file_path = failures_dir.join(format!("{}.html", test_name));
    fs::write(&file_path, html)?;
    fs::write(failures_dir.join(format!("{}.location", test_name)), location)?;

    println!("Saved failed HTML for {} to {}", location, file_path.display());
    Ok(file_path)
}
