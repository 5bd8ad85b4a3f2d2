// tests/common/mod.rs
//
// In-memory stand-ins for the remote API.
//
#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::json;
use venue_scrape::{FetchError, SearchQuery, VenueApi};

type Responder = dyn Fn(&SearchQuery, usize) -> Result<String, FetchError> + Send + Sync;

/// Answers every search through `respond(query, call_index)` and records queries.
pub struct StubApi {
    respond: Box<Responder>,
    categories: String,
    pub calls: Mutex<Vec<SearchQuery>>,
}

impl StubApi {
    pub fn new(
        respond: impl Fn(&SearchQuery, usize) -> Result<String, FetchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            categories: json!({ "response": { "categories": [] } }).to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every search returns exactly `n` distinct venues.
    pub fn always(n: usize) -> Self {
        Self::new(move |q, i| Ok(venue_body(n, &format!("c{i}"), q)))
    }

    pub fn with_categories(mut self, body: serde_json::Value) -> Self {
        self.categories = body.to_string();
        self
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.calls.lock().unwrap().clone()
    }
}

impl VenueApi for StubApi {
    fn search(&self, query: &SearchQuery) -> Result<String, FetchError> {
        let idx = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(query.clone());
            calls.len() - 1
        };
        (self.respond)(query, idx)
    }

    fn categories(&self) -> Result<String, FetchError> {
        Ok(self.categories.clone())
    }
}

/// A search payload with `n` venues placed at the query center, ids `{prefix}-{k}`.
pub fn venue_body(n: usize, prefix: &str, q: &SearchQuery) -> String {
    let venues: Vec<_> = (0..n)
        .map(|k| {
            json!({
                "id": format!("{prefix}-{k}"),
                "name": format!("Venue {k}"),
                "categories": [ { "id": q.category_id, "name": "Café" } ],
                "location": { "lat": q.center.lat, "lng": q.center.lng }
            })
        })
        .collect();
    json!({ "meta": { "code": 200 }, "response": { "venues": venues } }).to_string()
}
