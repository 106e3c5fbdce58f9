use anyhow::{Context, Result};
use hotel_scraper::{is_challenge_page, parse_hotels, BookingScraper};
use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Please provide a location and a test name");
        eprintln!("Usage: cargo run --bin save_scrape_failure <LOCATION> <test_name>");
        std::process::exit(1);
    }

    let location = &args[1];
    let test_name = &args[2];

    let scraper = BookingScraper::new()?;
    let url = scraper.search_url_for(location)?;

    println!("Fetching HTML from {}...", url);
    let html = scraper.fetch_html(url.as_str(), None)?;

    // Create failures directory if it doesn't exist
    let failures_dir = Path::new("src/tests/fixtures/failures");
    fs::create_dir_all(failures_dir).context("Failed to create failures directory")?;

    let file_path = failures_dir.join(format!("{}.html", test_name));
    fs::write(&file_path, &html).context("Failed to write HTML file")?;

    // The regression test parses the page against the location it was searched for
    let location_path = failures_dir.join(format!("{}.location", test_name));
    fs::write(&location_path, location).context("Failed to write location file")?;

    println!(
        "Saved HTML to {} for regression testing",
        file_path.display()
    );

    println!("\nAttempting to parse with the scraper to confirm failure:");

    if is_challenge_page(&html) {
        println!("⚠️ Page is a verification challenge, not a search result.");
        println!("   Regression tests will report it until it is replaced.");
        return Ok(());
    }

    let hotels = parse_hotels(&html, location, 5, "")?;
    if hotels.is_empty() {
        println!("✅ No property cards found - structural issue");
        println!("\nThis test case has been saved and will be included in regression tests.");
        return Ok(());
    }

    println!("⚠️ Parse found {} hotels! This may not be a failure case.", hotels.len());
    for (i, hotel) in hotels.iter().enumerate() {
        let images = hotel.partition_images();
        println!(
            "  {}. {} - ${} ({} real images)",
            i + 1,
            hotel.name,
            hotel.price,
            images.real.len()
        );
    }

    Ok(())
}
