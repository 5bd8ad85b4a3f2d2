// src/lib.rs
//! Venue scraping over a bounding box with adaptive grid refinement, plus
//! flattening of the category taxonomy.
//!
//! ```text
//! cli → scrape::GridRefiner → scrape::Fetcher → core::net::VenueApi
//!                                            ↘ specs::venues (parse)
//!     → scrape::fetch_taxonomy → specs::categories → scrape::flatten
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod csv;
pub mod error;
pub mod log;
pub mod progress;
pub mod scrape;
pub mod specs;
pub mod store;
pub mod types;

pub use crate::core::{BoundingBox, CancelToken, Cell, HttpApi, LatLng, VenueApi};
pub use error::{FailedQuery, FetchError, GeoError, Interrupted, ScrapeError};
pub use scrape::{fetch_taxonomy, flatten, refine, CategoryIndex, Fetcher, GridRefiner, Refinement};
pub use types::{CategoryNode, CategoryRow, SearchQuery, VenueRecord};
