// src/scrape/mod.rs
pub mod fetch;
pub mod refine;
pub mod taxonomy;

pub use fetch::Fetcher;
pub use refine::{refine, GridRefiner, Refinement};
pub use taxonomy::{fetch_taxonomy, flatten, CategoryIndex};
