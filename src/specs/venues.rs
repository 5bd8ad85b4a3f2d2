// src/specs/venues.rs
//! Spec for `venues/search`.
//!
//! Expected shape:
//! ```text
//! { "response": { "venues": [ { "id", "name", "categories": [{ "name" }], "location": { "lat", "lng" } } ] } }
//! ```
//! - `response` present but empty (`{}`) → no results.
//! - `response.venues` an empty array → no results.
//! - Anything else that does not match is a [`FetchError`], which the fetcher retries.

use serde::Deserialize;
use serde_json::Value;

use crate::config::consts::NOISE_CATEGORY;
use crate::error::FetchError;
use crate::types::VenueRecord;

/// Parsed search response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VenuePage {
    /// Venues after noise filtering.
    pub venues: Vec<VenueRecord>,
    /// Venues the API returned before filtering; this is what hits the cap.
    pub returned: usize,
}

#[derive(Deserialize)]
struct RawVenue {
    id: String,
    name: String,
    #[serde(default)]
    categories: Vec<RawCategory>,
    location: RawLocation,
}

// Only the first entry's name is used; the rest may omit it.
#[derive(Deserialize)]
struct RawCategory {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

pub fn parse(body: &str) -> Result<VenuePage, FetchError> {
    let doc: Value = serde_json::from_str(body)?;

    let response = doc
        .get("response")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Shape(s("missing `response` object")))?;
    if response.is_empty() {
        return Ok(VenuePage::default());
    }

    let venues = response
        .get("venues")
        .ok_or_else(|| FetchError::Shape(s("`response` has no `venues`")))?
        .as_array()
        .ok_or_else(|| FetchError::Shape(s("`response.venues` is not an array")))?;

    let mut out = Vec::with_capacity(venues.len());
    for v in venues {
        let raw = RawVenue::deserialize(v)?;
        let category = raw.categories.into_iter().next().and_then(|c| c.name);
        if category.as_deref() == Some(NOISE_CATEGORY) {
            continue;
        }
        out.push(VenueRecord {
            id: raw.id,
            name: raw.name,
            category,
            latitude: raw.location.lat,
            longitude: raw.location.lng,
        });
    }

    Ok(VenuePage { venues: out, returned: venues.len() })
}

fn s(msg: &str) -> String {
    msg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_VENUES: &str = r#"{
        "meta": { "code": 200 },
        "response": { "venues": [
            { "id": "a1", "name": "Corner Cafe",
              "categories": [ { "id": "c1", "name": "Café" }, { "id": "c2", "name": "Bakery" } ],
              "location": { "lat": 51.5, "lng": -0.12, "address": "1 High St" } },
            { "id": "a2", "name": "Food Truck",
              "categories": [ { "id": "c9", "name": "Moving Target" } ],
              "location": { "lat": 51.6, "lng": -0.13 } },
            { "id": "a3", "name": "Unlabelled",
              "categories": [],
              "location": { "lat": 51.7, "lng": -0.14 } }
        ] }
    }"#;

    #[test]
    fn keeps_first_category_and_drops_moving_target() {
        let page = parse(TWO_VENUES).unwrap();
        assert_eq!(page.returned, 3);
        let ids: Vec<&str> = page.venues.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a3"]);
        assert_eq!(page.venues[0].category.as_deref(), Some("Café"));
        assert_eq!(page.venues[0].latitude, 51.5);
        assert_eq!(page.venues[1].category, None);
    }

    #[test]
    fn unnamed_categories_do_not_reject_the_page() {
        let body = r#"{"response":{"venues":[
            { "id": "a", "name": "Two Tags",
              "categories": [ { "id": "c1", "name": "Café" }, { "id": "c2" } ],
              "location": { "lat": 1.0, "lng": 2.0 } },
            { "id": "b", "name": "Nameless Tag",
              "categories": [ { "id": "c3" } ],
              "location": { "lat": 1.5, "lng": 2.5 } }
        ]}}"#;
        let page = parse(body).unwrap();
        assert_eq!(page.returned, 2);
        assert_eq!(page.venues[0].category.as_deref(), Some("Café"));
        assert_eq!(page.venues[1].category, None);
    }

    #[test]
    fn empty_response_object_is_no_results() {
        let page = parse(r#"{"meta":{"code":200},"response":{}}"#).unwrap();
        assert!(page.venues.is_empty());
        assert_eq!(page.returned, 0);
    }

    #[test]
    fn empty_venue_list_is_no_results() {
        let page = parse(r#"{"response":{"venues":[]}}"#).unwrap();
        assert_eq!(page, VenuePage::default());
    }

    #[test]
    fn missing_response_is_an_error() {
        assert!(matches!(parse(r#"{"meta":{"code":500}}"#), Err(FetchError::Shape(_))));
        assert!(matches!(parse(r#"{"response":[]}"#), Err(FetchError::Shape(_))));
    }

    #[test]
    fn response_without_venues_is_an_error() {
        assert!(matches!(parse(r#"{"response":{"confident":false}}"#), Err(FetchError::Shape(_))));
    }

    #[test]
    fn truncated_json_and_bad_venues_are_errors() {
        assert!(matches!(parse(r#"{"response":{"venues":["#), Err(FetchError::Json(_))));
        let no_location = r#"{"response":{"venues":[{"id":"x","name":"y"}]}}"#;
        assert!(matches!(parse(no_location), Err(FetchError::Json(_))));
    }
}
