// src/store.rs
//! In-memory tables handed to callers. Nothing here touches the disk.

use crate::types::{CategoryRow, VenueRecord};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataSet {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl DataSet {
    pub fn from_venues(venues: &[VenueRecord]) -> Self {
        Self {
            headers: Some(headers(&VenueRecord::HEADERS)),
            rows: venues.iter().map(VenueRecord::to_row).collect(),
        }
    }

    pub fn from_categories(rows: &[CategoryRow]) -> Self {
        Self {
            headers: Some(headers(&CategoryRow::HEADERS)),
            rows: rows.iter().map(CategoryRow::to_row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
