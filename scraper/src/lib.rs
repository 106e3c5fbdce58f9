pub mod cli;
pub mod error;
pub mod hotel;
pub mod report;
pub mod scraper;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::error::ScrapeError;
pub use crate::hotel::{
    is_real_image, partition_images, HotelRecord, ImagePartition, Rating, FALLBACK_IMAGES,
    TRUSTED_IMAGE_HOST,
};
pub use crate::report::{get_real_images, output_file_name, print_summary, save_hotels};
pub use crate::scraper::{
    fallback_hotels, fetch_until_clear, is_challenge_page, parse_hotels, scrape_hotels_manual,
    search_url, BookingScraper, ChallengeReply, HotelSource,
};
