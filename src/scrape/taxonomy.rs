// src/scrape/taxonomy.rs
//! Flatten the category forest into one row per node with its ancestor chain.

use std::collections::HashMap;

use tracing::{debug, error, info};

use crate::config::consts::TAXONOMY_LEVELS;
use crate::core::VenueApi;
use crate::error::FetchError;
use crate::specs;
use crate::types::{CategoryNode, CategoryRow};

/// Fetch the taxonomy once and flatten it. Failures are not retried.
pub fn fetch_taxonomy<A: VenueApi + ?Sized>(api: &A) -> Result<Vec<CategoryRow>, FetchError> {
    let roots = api
        .categories()
        .and_then(|body| specs::categories::parse(&body))
        .inspect_err(|e| error!("category request failed: {e}"))?;
    let rows = flatten(&roots);
    info!(roots = roots.len(), rows = rows.len(), "taxonomy flattened");
    Ok(rows)
}

/// Pre-order walk, at most five levels deep. Children below level five are skipped.
pub fn flatten(roots: &[CategoryNode]) -> Vec<CategoryRow> {
    let mut rows = Vec::new();
    let mut chain: Vec<&str> = Vec::with_capacity(TAXONOMY_LEVELS);
    for root in roots {
        visit(root, &mut chain, &mut rows);
    }
    rows
}

fn visit<'n>(node: &'n CategoryNode, chain: &mut Vec<&'n str>, rows: &mut Vec<CategoryRow>) {
    chain.push(&node.id);
    rows.push(CategoryRow::from_chain(chain));

    if chain.len() < TAXONOMY_LEVELS {
        for child in &node.children {
            visit(child, chain, rows);
        }
    } else if !node.children.is_empty() {
        debug!(id = %node.id, skipped = node.children.len(), "children below level {TAXONOMY_LEVELS} ignored");
    }

    chain.pop();
}

/// Lookup of flattened rows by `category_id`, for rolling venue categories up
/// to an ancestor level.
#[derive(Clone, Debug, Default)]
pub struct CategoryIndex {
    by_id: HashMap<String, CategoryRow>,
}

impl CategoryIndex {
    pub fn new(rows: &[CategoryRow]) -> Self {
        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            by_id.entry(row.category_id.clone()).or_insert_with(|| row.clone());
        }
        Self { by_id }
    }

    pub fn get(&self, category_id: &str) -> Option<&CategoryRow> {
        self.by_id.get(category_id)
    }

    /// Ancestor of `category_id` at `level` (1 = root).
    pub fn ancestor(&self, category_id: &str, level: usize) -> Option<&str> {
        self.get(category_id)?.level(level)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, children: Vec<CategoryNode>) -> CategoryNode {
        CategoryNode::with_children(id, children)
    }

    fn levels(row: &CategoryRow) -> [&str; 6] {
        [
            &row.category_id, &row.level5_id, &row.level4_id,
            &row.level3_id, &row.level2_id, &row.level1_id,
        ]
    }

    #[test]
    fn single_branch_of_depth_three() {
        let forest = vec![node("root", vec![node("child", vec![CategoryNode::leaf("grand")])])];
        let rows = flatten(&forest);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.level1_id == "root"));

        assert_eq!(levels(&rows[0]), ["root"; 6]);
        assert_eq!(levels(&rows[1]), ["child", "child", "child", "child", "child", "root"]);
        assert_eq!(levels(&rows[2]), ["grand", "grand", "grand", "grand", "child", "root"]);
        assert_eq!(rows[2].level4_id, rows[2].level5_id);
    }

    #[test]
    fn pre_order_visits_children_before_siblings() {
        let forest = vec![
            node("a", vec![node("a1", vec![CategoryNode::leaf("a1x")]), CategoryNode::leaf("a2")]),
            CategoryNode::leaf("b"),
        ];
        let order: Vec<String> = flatten(&forest).into_iter().map(|r| r.category_id).collect();
        assert_eq!(order, ["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn full_depth_chain_fills_every_level() {
        let deep = node("l1", vec![node("l2", vec![node("l3", vec![node("l4", vec![CategoryNode::leaf("l5")])])])]);
        let rows = flatten(&[deep]);
        assert_eq!(rows.len(), 5);
        assert_eq!(levels(&rows[4]), ["l5", "l5", "l4", "l3", "l2", "l1"]);
        assert_eq!(levels(&rows[3]), ["l4", "l4", "l4", "l3", "l2", "l1"]);
    }

    #[test]
    fn nodes_below_level_five_are_not_visited() {
        let six = node("l1", vec![node("l2", vec![node("l3", vec![node("l4", vec![
            node("l5", vec![CategoryNode::leaf("l6")]),
        ])])])]);
        let rows = flatten(&[six]);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.category_id != "l6"));
    }

    #[test]
    fn empty_forest_yields_nothing() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn index_rolls_up_to_ancestors() {
        let forest = vec![node("food", vec![node("asian", vec![CategoryNode::leaf("thai")])])];
        let index = CategoryIndex::new(&flatten(&forest));
        assert_eq!(index.len(), 3);
        assert_eq!(index.ancestor("thai", 1), Some("food"));
        assert_eq!(index.ancestor("thai", 2), Some("asian"));
        assert_eq!(index.ancestor("thai", 5), Some("thai"));
        assert_eq!(index.ancestor("asian", 4), Some("asian"));
        assert_eq!(index.ancestor("missing", 1), None);
    }
}
