use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::COOKIE;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScrapeError;
use crate::hotel::{is_real_image, HotelRecord, Rating, FALLBACK_IMAGES};

pub const SEARCH_URL: &str = "https://www.booking.com/searchresults.html";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const PROPERTY_CARD_MARKER: &str = r#"data-testid="property-card""#;
const CHALLENGE_MARKERS: [&str; 4] = [
    "captcha",
    "challenge-form",
    "are you a robot",
    "verify you are human",
];
const AMENITIES: [&str; 3] = ["WiFi", "Air Conditioning", "Free Breakfast"];

/// Anything that can turn a location into a list of hotels.
pub trait HotelSource {
    /// `interactive` allows the source to block on a human, e.g. to clear a captcha.
    fn scrape_hotels(
        &self,
        location: &str,
        max_results: usize,
        interactive: bool,
    ) -> Result<Vec<HotelRecord>>;
}

/// Scrapes the Booking.com search results page over plain HTTP.
pub struct BookingScraper {
    client: Client,
    search_url: String,
}

impl BookingScraper {
    pub fn new() -> Result<Self> {
        Self::with_search_url(SEARCH_URL)
    }

    pub fn with_search_url(search_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(BookingScraper {
            client,
            search_url: search_url.to_string(),
        })
    }

    pub fn search_url_for(&self, location: &str) -> Result<Url> {
        search_url(&self.search_url, location, Local::now().date_naive())
    }

    /// Challenge pages are often served with 403/429, so their bodies are
    /// returned instead of failing on the status. `cookie` is sent verbatim
    /// as the `Cookie` header.
    pub fn fetch_html(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        info!("Navigating to {}", url);
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().context("Failed to send request")?;
        let status = response.status();
        let html = response.text().context("Failed to get response text")?;

        if !status.is_success() && !is_challenge_page(&html) {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        Ok(html)
    }

    /// Same as `scrape_hotels`, with the challenge prompt on `out` and the
    /// user's replies read from `input`.
    ///
    /// Fetch and parse failures fall back to placeholder hotels; only an
    /// unresolved interactive challenge is an error.
    pub fn scrape_with_prompt<R, W>(
        &self,
        location: &str,
        max_results: usize,
        interactive: bool,
        input: &mut R,
        out: &mut W,
    ) -> Result<Vec<HotelRecord>>
    where
        R: BufRead,
        W: Write,
    {
        info!(
            "Scraping {} hotels from Booking.com for: {}",
            max_results, location
        );
        let url = self.search_url_for(location)?;

        let page = match fetch_until_clear(
            url.as_str(),
            interactive,
            |cookie| self.fetch_html(url.as_str(), cookie),
            input,
            out,
        ) {
            Ok(page) => page,
            Err(err) if is_unresolved_challenge(&err) => return Err(err),
            Err(err) => {
                warn!("Error during scraping: {:#}", err);
                None
            }
        };

        let scraped_at = Utc::now().to_rfc3339();
        let hotels = match page {
            Some(html) => parse_hotels(&html, location, max_results, &scraped_at)
                .unwrap_or_else(|err| {
                    warn!("Failed to parse search results: {:#}", err);
                    Vec::new()
                }),
            None => Vec::new(),
        };

        if hotels.is_empty() {
            warn!("No hotels found for {}, using fallback data", location);
            return Ok(fallback_hotels(location, max_results, &scraped_at));
        }

        info!("Scraped {} hotels successfully", hotels.len());
        Ok(hotels)
    }
}

impl HotelSource for BookingScraper {
    fn scrape_hotels(
        &self,
        location: &str,
        max_results: usize,
        interactive: bool,
    ) -> Result<Vec<HotelRecord>> {
        self.scrape_with_prompt(
            location,
            max_results,
            interactive,
            &mut io::stdin().lock(),
            &mut io::stdout(),
        )
    }
}

fn is_unresolved_challenge(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ScrapeError>(),
        Some(ScrapeError::ChallengeUnresolved { .. })
    )
}

/// Runs the Booking.com scraper with default settings.
pub fn scrape_hotels_manual(
    location: &str,
    max_results: usize,
    interactive: bool,
) -> Result<Vec<HotelRecord>> {
    BookingScraper::new()?.scrape_hotels(location, max_results, interactive)
}

/// Search results URL for one adult pair, one room, one night from `check_in`.
pub fn search_url(base: &str, location: &str, check_in: NaiveDate) -> Result<Url> {
    let check_out = check_in
        .succ_opt()
        .context("Check-in date is out of range")?;
    let check_in = check_in.format("%Y-%m-%d").to_string();
    let check_out = check_out.format("%Y-%m-%d").to_string();

    Url::parse_with_params(
        base,
        &[
            ("checkin", check_in.as_str()),
            ("checkout", check_out.as_str()),
            ("selected_currency", "USD"),
            ("ss", location),
            ("ssne", location),
            ("ssne_untouched", location),
            ("lang", "en-us"),
            ("sb", "1"),
            ("src_elem", "sb"),
            ("src", "searchresults"),
            ("dest_type", "city"),
            ("group_adults", "2"),
            ("no_rooms", "1"),
            ("group_children", "0"),
            ("sb_travel_purpose", "leisure"),
        ],
    )
    .with_context(|| format!("Invalid search URL: {}", base))
}

pub fn is_challenge_page(html: &str) -> bool {
    if html.contains(PROPERTY_CARD_MARKER) {
        return false;
    }
    let lower = html.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// What the user typed at the verification prompt.
#[derive(Debug, PartialEq)]
pub enum ChallengeReply {
    /// Empty line: fetch again with the current cookie.
    Retry,
    /// `skip`: give up and let the caller fall back.
    Skip,
    /// `cookie: <header>`: the browser's Cookie header after solving the challenge.
    Cookie(String),
    /// Anything else: path of the results page saved from the browser.
    SavedPage(PathBuf),
}

impl ChallengeReply {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChallengeReply::Retry;
        }
        if line.eq_ignore_ascii_case("skip") {
            return ChallengeReply::Skip;
        }
        match line.split_once(':') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("cookie") => {
                ChallengeReply::Cookie(value.trim().to_string())
            }
            _ => ChallengeReply::SavedPage(PathBuf::from(line)),
        }
    }
}

/// Fetches until the page is no longer a verification challenge.
///
/// In headless mode a challenge yields `Ok(None)`. In interactive mode the
/// user solves the challenge in a browser and answers with a `ChallengeReply`;
/// `skip` yields `Ok(None)` and end of input is `ChallengeUnresolved`.
pub fn fetch_until_clear<F, R, W>(
    url: &str,
    interactive: bool,
    mut fetch: F,
    input: &mut R,
    out: &mut W,
) -> Result<Option<String>>
where
    F: FnMut(Option<&str>) -> Result<String>,
    R: BufRead,
    W: Write,
{
    let mut cookie: Option<String> = None;
    let mut html = fetch(None)?;

    loop {
        if !is_challenge_page(&html) {
            return Ok(Some(html));
        }

        if !interactive {
            warn!("Verification challenge at {} in headless mode", url);
            return Ok(None);
        }

        writeln!(out, "\nBooking.com is asking for verification.")?;
        writeln!(out, "Open {} in your browser and solve the captcha, then either:", url)?;
        writeln!(out, "  - paste the request's Cookie header as `cookie: <value>`,")?;
        writeln!(out, "  - enter the path of the results page saved from the browser,")?;
        writeln!(out, "  - press Enter to try again, or type `skip` to use fallback data.")?;
        out.flush()?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Err(ScrapeError::ChallengeUnresolved {
                url: url.to_string(),
            }
            .into());
        }

        match ChallengeReply::parse(&line) {
            ChallengeReply::Retry => {
                info!("Retrying {}", url);
                html = fetch(cookie.as_deref())?;
            }
            ChallengeReply::Cookie(value) => {
                info!("Retrying {} with browser cookie", url);
                cookie = Some(value);
                html = fetch(cookie.as_deref())?;
            }
            ChallengeReply::Skip => {
                warn!("Verification challenge at {} skipped", url);
                return Ok(None);
            }
            ChallengeReply::SavedPage(path) => match fs::read_to_string(&path) {
                Ok(page) => {
                    info!("Using saved page {}", path.display());
                    html = page;
                }
                Err(err) => writeln!(out, "Could not read {}: {}", path.display(), err)?,
            },
        }
    }
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

fn first_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}

/// Parses up to `max_results` property cards from a search results page.
pub fn parse_hotels(
    html: &str,
    location: &str,
    max_results: usize,
    scraped_at: &str,
) -> Result<Vec<HotelRecord>> {
    let document = Html::parse_document(html);

    let card_selector = selector(r#"[data-testid="property-card"]"#)?;
    let title_selector = selector(r#"[data-testid="title"]"#)?;
    let price_selector = selector(r#"[data-testid="price-and-discounted-price"]"#)?;
    let rating_selector = selector(r#"[data-testid="review-score"]"#)?;
    let image_selector = selector(r#"img[data-testid="image"]"#)?;
    let card_link_selector = selector(r#"a[data-testid="property-card-desktop-single-image"]"#)?;
    let hotel_link_selector = selector(r#"a[href*="booking.com/hotel"]"#)?;

    let base = Url::parse(SEARCH_URL).context("Invalid search URL")?;

    let mut hotels = Vec::new();
    for (i, card) in document.select(&card_selector).take(max_results).enumerate() {
        let name = first_text(card, &title_selector).unwrap_or_else(|| format!("Hotel {}", i + 1));

        let price = first_text(card, &price_selector)
            .and_then(|text| extract_price(&text))
            .unwrap_or_else(|| {
                debug!("No price found for {}", name);
                0
            });

        let score = first_text(card, &rating_selector).and_then(|text| extract_rating(&text));
        let rating = score
            .map(Rating::from)
            .unwrap_or_else(|| Rating::Text("N/A".to_string()));

        let mut images: Vec<String> = card
            .select(&image_selector)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| is_real_image(src))
            .map(str::to_string)
            .collect();
        if images.is_empty() {
            debug!("No Booking.com images for {}, using stock photos", name);
            images = FALLBACK_IMAGES.iter().map(|url| url.to_string()).collect();
        }

        let booking_url = card
            .select(&card_link_selector)
            .chain(card.select(&hotel_link_selector))
            .find_map(|link| link.value().attr("href"))
            .and_then(|href| base.join(href).ok())
            .map(String::from)
            .unwrap_or_else(|| hotel_search_url(&name));

        let mut hotel = HotelRecord::new(name, price, rating).with_images(images);
        hotel.currency = Some("USD".to_string());
        hotel.booking_url = Some(booking_url);
        hotel.address = Some(location.to_string());
        hotel.source = Some("Booking.com".to_string());
        hotel.scraped_at = Some(scraped_at.to_string());
        if let Some(score) = score {
            add_review_details(&mut hotel, score, BOOKING_SCORE_SCALE);
        }
        add_amenities(&mut hotel);
        hotels.push(hotel);
    }

    debug!("Parsed {} property cards", hotels.len());
    Ok(hotels)
}

/// First dollar amount in `text`, ignoring thousands separators.
pub fn extract_price(text: &str) -> Option<u64> {
    text.match_indices('$').find_map(|(idx, _)| {
        let digits: String = text[idx + 1..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

/// First decimal number in `text`, e.g. 8.5 from "Scored 8.5 Very good".
pub fn extract_rating(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];

    let mut end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if let Some(fraction) = rest[end..].strip_prefix('.') {
        let digits = fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
        if digits > 0 {
            end += 1 + digits;
        }
    }

    rest[..end].parse().ok()
}

// Booking.com review scores run to 10, fallback ratings to 5
const BOOKING_SCORE_SCALE: u32 = 10;
const FALLBACK_RATING_SCALE: u32 = 5;

/// `stars` (score mapped onto 1-5, rounded up) and `avgReview` ("8.5/10").
fn add_review_details(hotel: &mut HotelRecord, score: f64, scale: u32) {
    let stars = (score * 5.0 / f64::from(scale)).ceil().clamp(1.0, 5.0) as u64;
    hotel.extra.insert("stars".to_string(), json!(stars));
    hotel.extra.insert(
        "avgReview".to_string(),
        Value::String(format!("{}/{}", hotel.rating, scale)),
    );
}

fn add_amenities(hotel: &mut HotelRecord) {
    hotel
        .extra
        .insert("amenities".to_string(), json!(AMENITIES));
}

fn hotel_search_url(name: &str) -> String {
    Url::parse_with_params(SEARCH_URL, &[("ss", name)])
        .map(String::from)
        .unwrap_or_else(|_| SEARCH_URL.to_string())
}

#[derive(Clone, Copy)]
enum Tier {
    Luxury,
    Mid,
    Budget,
}

impl Tier {
    fn price(self) -> u64 {
        match self {
            Tier::Luxury => 450,
            Tier::Mid => 220,
            Tier::Budget => 80,
        }
    }

    fn rating(self) -> f64 {
        match self {
            Tier::Luxury => 4.7,
            Tier::Mid => 4.3,
            Tier::Budget => 3.8,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tier::Luxury => "luxury",
            Tier::Mid => "mid-range",
            Tier::Budget => "budget",
        }
    }
}

// (prefix, suffix, tier) around the lowercased city name
const FALLBACK_TEMPLATES: [(&str, &str, Tier); 8] = [
    ("Grand ", " Hotel", Tier::Luxury),
    ("", " Comfort Inn", Tier::Mid),
    ("", " Hostel", Tier::Budget),
    ("", " Plaza Hotel", Tier::Luxury),
    ("", " Express Inn", Tier::Mid),
    ("", " Marriott", Tier::Luxury),
    ("", " Hilton", Tier::Luxury),
    ("", " Hyatt", Tier::Luxury),
];

/// Placeholder hotels for when the search page yields nothing usable.
pub fn fallback_hotels(location: &str, max_results: usize, scraped_at: &str) -> Vec<HotelRecord> {
    let lowered = location.to_lowercase();
    let city = lowered.split(',').next().unwrap_or("").trim();

    FALLBACK_TEMPLATES
        .iter()
        .take(max_results)
        .enumerate()
        .map(|(i, (prefix, suffix, tier))| {
            let name = format!("{}{}{}", prefix, city, suffix);
            let mut hotel = HotelRecord::new(name.clone(), tier.price(), Rating::from(tier.rating()))
                .with_images(FALLBACK_IMAGES);
            hotel.currency = Some("USD".to_string());
            hotel.booking_url = Some(hotel_search_url(&name));
            hotel.address = Some(location.to_string());
            hotel.source = Some("Fallback".to_string());
            hotel.scraped_at = Some(scraped_at.to_string());
            add_review_details(&mut hotel, tier.rating(), FALLBACK_RATING_SCALE);
            add_amenities(&mut hotel);
            hotel
                .extra
                .insert("id".to_string(), Value::String(format!("fallback_{}", i + 1)));
            hotel.extra.insert(
                "description".to_string(),
                Value::String(format!(
                    "Comfortable {} accommodation in {}",
                    tier.label(),
                    location
                )),
            );
            hotel
        })
        .collect()
}
