// src/error.rs
//! Error types shared by the fetcher, the grid refiner and the taxonomy fetch.

use std::fmt;

use thiserror::Error;

use crate::core::geo::Cell;
use crate::scrape::Refinement;
use crate::types::SearchQuery;

/// Rejected bounding box. Raised before any request is made.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error("{side} boundary is not a finite number")]
    NonFinite { side: &'static str },

    #[error("south ({south}) must be below north ({north})")]
    LatitudeOrder { south: f64, north: f64 },

    #[error("west ({west}) must be west of east ({east}); boxes crossing the antimeridian are not supported")]
    LongitudeOrder { west: f64, east: f64 },

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeRange(f64),
}

/// One failed request. Every variant is transient from the fetcher's point of view.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Resume point handed back once the retry ceiling is hit.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedQuery {
    pub query: SearchQuery,
    pub attempts: u32,
    pub last_error: String,
}

impl fmt::Display for FailedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = &self.query;
        write!(
            f,
            "gave up after {} attempts: radius={} category={} lat={} lng={} ({})",
            self.attempts, q.radius_m, q.category_id, q.center.lat, q.center.lng, self.last_error
        )
    }
}

/// A refinement stopped by a cell that ran out of retries, with everything
/// gathered up to that point.
#[derive(Debug, Clone, PartialEq)]
pub struct Interrupted {
    pub failed: FailedQuery,
    pub failed_cell: Cell,
    /// Venues of the cells that completed. `truncated` and `queries` count
    /// the same cells.
    pub partial: Refinement,
    /// Cells still to query, the failed one included, in depth then grid
    /// order. Saturated cells of the interrupted depth appear as their four
    /// children.
    pub pending: Vec<Cell>,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} venues kept, {} cells pending)",
            self.failed,
            self.partial.venues.len(),
            self.pending.len()
        )
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),

    #[error("{0}")]
    Exhausted(FailedQuery),

    #[error("refinement interrupted: {0}")]
    Interrupted(Box<Interrupted>),

    #[error("cancelled")]
    Cancelled,
}

impl ScrapeError {
    /// The failed query to resume from, if this is a retry exhaustion.
    pub fn failed_query(&self) -> Option<&FailedQuery> {
        match self {
            ScrapeError::Exhausted(fq) => Some(fq),
            ScrapeError::Interrupted(i) => Some(&i.failed),
            _ => None,
        }
    }

    /// What a refinement had collected before a cell gave up.
    pub fn interrupted(&self) -> Option<&Interrupted> {
        match self {
            ScrapeError::Interrupted(i) => Some(i),
            _ => None,
        }
    }
}
