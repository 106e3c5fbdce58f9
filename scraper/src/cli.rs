use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_MAX_RESULTS: usize = 5;

pub const USAGE: &str = "Usage: get_real_images <location>\nExample: get_real_images 'New York'";

/// Get hotels with their real Booking.com images and save them as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// City or area to search, e.g. "New York"
    pub location: String,

    /// Maximum number of hotels to keep
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Never wait for a human to clear a verification challenge
    #[arg(long)]
    pub headless: bool,

    /// Directory for the real_hotels_*.json file
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl Cli {
    pub fn interactive(&self) -> bool {
        !self.headless
    }
}

/// A missing location gets the short usage text and exit status 1 instead
/// of clap's own report.
pub fn is_missing_location(err: &clap::Error) -> bool {
    err.kind() == ErrorKind::MissingRequiredArgument
}
