// src/specs/mod.rs
//! # Response "specs"
//!
//! One module per remote endpoint. Each spec knows **where the data lives in the
//! JSON payload** and how to shape it into the crate's types.
//!
//! ## What lives here
//! - Pure parsing of response bodies (`&str` in, typed values out).
//! - The rules for what counts as "no results" versus a malformed response.
//! - Endpoint-specific filtering (e.g. dropping noise venues).
//!
//! ## What does **not** live here
//! - Networking (`core::net`) and retries (`scrape::fetch`).
//! - Grid refinement or taxonomy flattening (`scrape`).
//!
//! Specs are testable offline against literal payloads.
pub mod categories;
pub mod venues;
