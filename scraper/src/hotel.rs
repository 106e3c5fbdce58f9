use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Images served from this host come straight from Booking.com listings.
pub const TRUSTED_IMAGE_HOST: &str = "cf.bstatic.com";

/// Stock photos used when a listing has no Booking.com images.
pub const FALLBACK_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800&h=600&fit=crop&q=80",
    "https://images.unsplash.com/photo-1571896349842-33c89424de2d?w=800&h=600&fit=crop&q=80",
    "https://images.unsplash.com/photo-1582719478250-c89cae4dc85b?w=800&h=600&fit=crop&q=80",
];

/// Review score as the source reported it: a number, or free text such as "N/A".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Rating {
    Score(Number),
    Text(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(n) => write!(f, "{}", n),
            Rating::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Rating {
    fn from(score: f64) -> Self {
        Number::from_f64(score)
            .map(Rating::Score)
            .unwrap_or_else(|| Rating::Text(score.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HotelRecord {
    pub name: String,
    pub price: Number,
    pub rating: Rating,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, rename = "bookingUrl", skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, rename = "scrapedAt", skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
    /// Fields this crate does not model, kept so they survive a save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HotelRecord {
    pub fn new(name: impl Into<String>, price: impl Into<Number>, rating: Rating) -> Self {
        HotelRecord {
            name: name.into(),
            price: price.into(),
            rating,
            images: Vec::new(),
            currency: None,
            booking_url: None,
            address: None,
            source: None,
            scraped_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn partition_images(&self) -> ImagePartition<'_> {
        partition_images(&self.images)
    }
}

/// Image URLs split by whether they come from the trusted host.
#[derive(Debug, Default, PartialEq)]
pub struct ImagePartition<'a> {
    pub real: Vec<&'a str>,
    pub fallback: Vec<&'a str>,
}

pub fn is_real_image(url: &str) -> bool {
    url.contains(TRUSTED_IMAGE_HOST)
}

/// Splits `images` into real and fallback URLs, keeping the original order in each.
pub fn partition_images(images: &[String]) -> ImagePartition<'_> {
    let (real, fallback): (Vec<&str>, Vec<&str>) = images
        .iter()
        .map(String::as_str)
        .partition(|url| is_real_image(url));
    ImagePartition { real, fallback }
}
