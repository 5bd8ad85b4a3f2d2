// src/specs/categories.rs
//! Spec for `venues/categories`: `{ "response": { "categories": [CategoryNode, …] } }`.

use serde::Deserialize;

use crate::error::FetchError;
use crate::types::CategoryNode;

#[derive(Deserialize)]
struct Envelope {
    response: Body,
}

#[derive(Deserialize)]
struct Body {
    categories: Vec<CategoryNode>,
}

/// Root categories in API order.
pub fn parse(body: &str) -> Result<Vec<CategoryNode>, FetchError> {
    let env: Envelope = serde_json::from_str(body)?;
    Ok(env.response.categories)
}
