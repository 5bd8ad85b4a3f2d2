// src/config/consts.rs

// Net config
pub const API_BASE_URL: &str = "https://api.foursquare.com/v2";
pub const API_VERSION: &str = "20200921";
pub const USER_AGENT: &str = concat!("venue_scrape/", env!("CARGO_PKG_VERSION"));
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// Retry
pub const MAX_RETRIES: u32 = 30;
pub const RETRY_PAUSE_MS: u64 = 75; // be polite

// Grid
pub const EARTH_RADIUS_M: f64 = 6_379_000.0; // slightly above the equatorial radius
pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_DEPTH: u32 = 4; // 16x16 cells
pub const DEPTH_CEILING: u32 = 10;

// Venues tagged with this category are API noise
pub const NOISE_CATEGORY: &str = "Moving Target";

// Taxonomy
pub const TAXONOMY_LEVELS: usize = 5;

// Logging
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = ".store/debug.log";
pub const LOG_ENV: &str = "VENUE_SCRAPE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

// Concurrency
pub const WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 8;
