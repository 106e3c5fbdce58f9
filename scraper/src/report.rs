use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::hotel::HotelRecord;
use crate::scraper::HotelSource;

/// How many URLs of each image class the summary prints.
pub const IMAGES_SHOWN: usize = 2;

/// `real_hotels_<location>.json`, with spaces turned into underscores and commas dropped.
pub fn output_file_name(location: &str) -> String {
    format!(
        "real_hotels_{}.json",
        location.replace(' ', "_").replace(',', "")
    )
}

pub fn print_summary<W: Write>(out: &mut W, hotels: &[HotelRecord]) -> Result<()> {
    writeln!(out, "\nFound {} hotels with real images:", hotels.len())?;

    for (i, hotel) in hotels.iter().enumerate() {
        writeln!(out, "\n{}. {}", i + 1, hotel.name)?;
        writeln!(out, "   Price: ${}", hotel.price)?;
        writeln!(out, "   Rating: {}", hotel.rating)?;
        writeln!(out, "   Images: {}", hotel.images.len())?;

        let images = hotel.partition_images();
        if !images.real.is_empty() {
            writeln!(out, "   ✓ {} real Booking.com images", images.real.len())?;
            for url in images.real.iter().take(IMAGES_SHOWN) {
                writeln!(out, "      {}", url)?;
            }
        }
        if !images.fallback.is_empty() {
            writeln!(out, "   - {} fallback images", images.fallback.len())?;
            for url in images.fallback.iter().take(IMAGES_SHOWN) {
                writeln!(out, "      {}", url)?;
            }
        }
    }

    Ok(())
}

/// Writes `hotels` as pretty JSON, replacing any file already at `path`.
pub fn save_hotels(path: &Path, hotels: &[HotelRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(hotels).context("Failed to serialize hotels")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Scrapes `location`, prints the summary to `out` and saves the results
/// under `output_dir`. Returns the path written.
pub fn get_real_images<S, W>(
    source: &S,
    location: &str,
    max_results: usize,
    interactive: bool,
    output_dir: &Path,
    out: &mut W,
) -> Result<PathBuf>
where
    S: HotelSource + ?Sized,
    W: Write,
{
    writeln!(out, "Getting real Booking.com images for: {}", location)?;
    if interactive {
        writeln!(
            out,
            "If Booking.com asks for verification, solve it in your browser when prompted."
        )?;
    }

    let hotels = source.scrape_hotels(location, max_results, interactive)?;
    info!("Got {} hotels for {}", hotels.len(), location);

    print_summary(out, &hotels)?;

    let output_file = output_dir.join(output_file_name(location));
    save_hotels(&output_file, &hotels)?;

    writeln!(out, "\nResults saved to: {}", output_file.display())?;
    Ok(output_file)
}
