// src/types.rs
use serde::{Deserialize, Serialize};

use crate::config::consts::TAXONOMY_LEVELS;
use crate::core::geo::LatLng;

/// One venue as returned by a search, normalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: String,
    pub name: String,
    /// First entry of the venue's category list, if any.
    pub category: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl VenueRecord {
    pub const HEADERS: [&'static str; 5] = ["ID", "name", "categories", "latitude", "longitude"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.category.clone().unwrap_or_default(),
            self.latitude.to_string(),
            self.longitude.to_string(),
        ]
    }
}

/// Parameters of one circular search request.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub center: LatLng,
    pub radius_m: f64,
    pub category_id: String,
    pub limit: u32,
}

/// Node of the category forest. Children sit under `categories` in the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "categories")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn leaf(id: &str) -> Self {
        Self { id: id.to_string(), name: String::new(), children: Vec::new() }
    }

    pub fn with_children(id: &str, children: Vec<CategoryNode>) -> Self {
        Self { id: id.to_string(), name: String::new(), children }
    }
}

/// A category with its full ancestor chain, one column per taxonomy level.
///
/// Levels below the node's own depth repeat the node's id, so every row can be
/// joined on `category_id` and rolled up to any level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category_id: String,
    pub level5_id: String,
    pub level4_id: String,
    pub level3_id: String,
    pub level2_id: String,
    pub level1_id: String,
}

impl CategoryRow {
    pub const HEADERS: [&'static str; 6] = ["categories", "c5", "c4", "c3", "c2", "c1"];

    /// Build from the root-first ancestor chain ending at the node itself.
    /// `chain` must hold between 1 and 5 ids.
    pub(crate) fn from_chain(chain: &[&str]) -> Self {
        debug_assert!(!chain.is_empty() && chain.len() <= TAXONOMY_LEVELS);
        let own = chain[chain.len() - 1];
        let at = |level: usize| chain.get(level - 1).copied().unwrap_or(own).to_string();
        Self {
            category_id: own.to_string(),
            level5_id: at(5),
            level4_id: at(4),
            level3_id: at(3),
            level2_id: at(2),
            level1_id: at(1),
        }
    }

    /// Id at `level` (1 = root). Out-of-range levels return `None`.
    pub fn level(&self, level: usize) -> Option<&str> {
        match level {
            1 => Some(&self.level1_id),
            2 => Some(&self.level2_id),
            3 => Some(&self.level3_id),
            4 => Some(&self.level4_id),
            5 => Some(&self.level5_id),
            _ => None,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.category_id.clone(),
            self.level5_id.clone(),
            self.level4_id.clone(),
            self.level3_id.clone(),
            self.level2_id.clone(),
            self.level1_id.clone(),
        ]
    }
}
