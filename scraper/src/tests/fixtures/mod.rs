use std::fs;
use std::path::Path;

const FAILURES_DIR: &str = "src/tests/fixtures/failures";

/// Load a saved search results page by name
pub fn load_html_fixture(fixture_name: &str) -> String {
    let path = Path::new("src/tests/fixtures").join(format!("{}.html", fixture_name));
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {}", fixture_name))
}

/// Load a search page that the scraper failed on
pub fn load_failure_html(failure_name: &str) -> Option<String> {
    let path = Path::new(FAILURES_DIR).join(format!("{}.html", failure_name));
    fs::read_to_string(path).ok()
}

/// Location a failure page was searched for; pages saved without one replay as "Regression"
pub fn load_failure_location(failure_name: &str) -> String {
    let path = Path::new(FAILURES_DIR).join(format!("{}.location", failure_name));
    fs::read_to_string(path)
        .map(|location| location.trim().to_string())
        .unwrap_or_else(|_| "Regression".to_string())
}
