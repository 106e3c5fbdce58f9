use crate::hotel::{HotelRecord, Rating};
use crate::report::{get_real_images, output_file_name, print_summary};
use crate::scraper::HotelSource;
use anyhow::Result;
use serde_json::json;
use std::cell::RefCell;
use std::fs;

/// Returns canned hotels and remembers how it was called.
struct CannedSource {
    hotels: Vec<HotelRecord>,
    calls: RefCell<Vec<(String, usize, bool)>>,
}

impl CannedSource {
    fn new(hotels: Vec<HotelRecord>) -> Self {
        CannedSource {
            hotels,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl HotelSource for CannedSource {
    fn scrape_hotels(
        &self,
        location: &str,
        max_results: usize,
        interactive: bool,
    ) -> Result<Vec<HotelRecord>> {
        self.calls
            .borrow_mut()
            .push((location.to_string(), max_results, interactive));
        Ok(self.hotels.clone())
    }
}

struct FailingSource;

impl HotelSource for FailingSource {
    fn scrape_hotels(&self, _: &str, _: usize, _: bool) -> Result<Vec<HotelRecord>> {
        Err(anyhow::anyhow!("browser crashed"))
    }
}

fn hotel_a() -> HotelRecord {
    HotelRecord::new("Hotel A", 100u64, Rating::from(4.5)).with_images([
        "https://cf.bstatic.com/x.jpg",
        "https://other.com/y.jpg",
    ])
}

#[test]
fn test_output_file_name() {
    assert_eq!(output_file_name("New York"), "real_hotels_New_York.json");
    assert_eq!(
        output_file_name("Paris, France"),
        "real_hotels_Paris_France.json"
    );
    assert_eq!(output_file_name("Tokyo"), "real_hotels_Tokyo.json");
    assert_eq!(output_file_name("a,,b  c"), "real_hotels_ab__c.json");
}

#[test]
fn test_new_york_example() {
    let dir = tempfile::tempdir().unwrap();
    let source = CannedSource::new(vec![hotel_a()]);
    let mut out = Vec::new();

    let path = get_real_images(&source, "New York", 5, true, dir.path(), &mut out).unwrap();

    assert_eq!(path, dir.path().join("real_hotels_New_York.json"));
    assert_eq!(
        *source.calls.borrow(),
        vec![("New York".to_string(), 5, true)]
    );

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        saved,
        json!([{
            "name": "Hotel A",
            "price": 100,
            "rating": 4.5,
            "images": ["https://cf.bstatic.com/x.jpg", "https://other.com/y.jpg"]
        }])
    );

    let console = String::from_utf8(out).unwrap();
    assert!(console.contains("1. Hotel A"));
    assert!(console.contains("Price: $100"));
    assert!(console.contains("Rating: 4.5"));
    assert!(console.contains("Images: 2"));
    assert!(console.contains("1 real Booking.com images"));
    assert!(console.contains("1 fallback images"));
    assert!(console.contains("real_hotels_New_York.json"));
}

#[test]
fn test_summary_numbers_every_hotel_from_one() {
    let hotels: Vec<_> = (0..4)
        .map(|i| HotelRecord::new(format!("Hotel {}", i), 50u64, Rating::from(3.0)))
        .collect();
    let mut out = Vec::new();

    print_summary(&mut out, &hotels).unwrap();

    let console = String::from_utf8(out).unwrap();
    assert!(console.contains("Found 4 hotels"));
    for i in 0..4 {
        assert!(console.contains(&format!("\n{}. Hotel {}\n", i + 1, i)));
    }
    assert!(!console.contains("5. "));
    assert!(!console.contains("0. Hotel"));
}

#[test]
fn test_summary_shows_at_most_two_images_per_class() {
    let hotel = HotelRecord::new("Busy", 10u64, Rating::Text("N/A".to_string())).with_images([
        "https://cf.bstatic.com/1.jpg",
        "https://cf.bstatic.com/2.jpg",
        "https://cf.bstatic.com/3.jpg",
        "https://stock.example/1.jpg",
        "https://stock.example/2.jpg",
        "https://stock.example/3.jpg",
    ]);
    let mut out = Vec::new();

    print_summary(&mut out, &[hotel]).unwrap();

    let console = String::from_utf8(out).unwrap();
    assert!(console.contains("3 real Booking.com images"));
    assert!(console.contains("3 fallback images"));
    assert!(console.contains("cf.bstatic.com/2.jpg"));
    assert!(!console.contains("cf.bstatic.com/3.jpg"));
    assert!(console.contains("stock.example/2.jpg"));
    assert!(!console.contains("stock.example/3.jpg"));
}

#[test]
fn test_empty_result_still_saved() {
    let dir = tempfile::tempdir().unwrap();
    let source = CannedSource::new(Vec::new());
    let mut out = Vec::new();

    let path = get_real_images(&source, "Nowhere", 5, false, dir.path(), &mut out).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    assert!(String::from_utf8(out).unwrap().contains("Found 0 hotels"));
}

#[test]
fn test_saved_file_keeps_non_ascii_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut cafe = HotelRecord::new("Hôtel Café Zürich 東京", 210u64, Rating::from(8.9))
        .with_images(["https://cf.bstatic.com/é.jpg"]);
    cafe.booking_url = Some("https://www.booking.com/hotel/ch/cafe.html".to_string());
    cafe.extra.insert("stars".to_string(), json!(4));
    let hotels = vec![cafe, hotel_a()];
    let source = CannedSource::new(hotels.clone());
    let mut out = Vec::new();

    let path = get_real_images(&source, "Zürich, CH", 5, true, dir.path(), &mut out).unwrap();
    assert_eq!(path, dir.path().join("real_hotels_Zürich_CH.json"));

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Hôtel Café Zürich 東京"));
    assert!(!raw.contains("\\u"));
    assert!(raw.contains("\n  {\n    \"name\""));

    let parsed: Vec<HotelRecord> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, hotels);
}

#[test]
fn test_existing_file_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("real_hotels_Oslo.json");
    fs::write(&path, "stale contents").unwrap();

    let source = CannedSource::new(vec![hotel_a()]);
    get_real_images(&source, "Oslo", 5, true, dir.path(), &mut Vec::<u8>::new()).unwrap();

    let parsed: Vec<HotelRecord> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, vec![hotel_a()]);
}

#[test]
fn test_source_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut out: Vec<u8> = Vec::new();

    let result = get_real_images(&FailingSource, "Lima", 5, true, dir.path(), &mut out);

    assert!(result.unwrap_err().to_string().contains("browser crashed"));
    assert!(!dir.path().join("real_hotels_Lima.json").exists());
}

#[test]
fn test_unwritable_output_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let source = CannedSource::new(vec![hotel_a()]);

    let result = get_real_images(&source, "Lima", 5, true, &missing, &mut Vec::<u8>::new());

    assert!(format!("{:#}", result.unwrap_err()).contains("Failed to write"));
}
