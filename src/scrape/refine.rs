// src/scrape/refine.rs
//! Adaptive grid refinement over a bounding box.
//!
//! Depth 0 queries the whole box once. Whenever a query comes back saturated
//! (the API returned exactly `limit` venues) the area is split into quadrants
//! and queried again at half the radius, down to `max_depth`. Every cell of a
//! depth is fetched before deciding on the next one.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::{debug, info, warn};

use crate::config::options::{RefineOptions, RetryPolicy, SubdivisionPolicy};
use crate::core::geo::{BoundingBox, Cell};
use crate::core::{CancelToken, VenueApi};
use crate::error::{Interrupted, ScrapeError};
use crate::progress::{NullProgress, Progress};
use crate::specs::venues::VenuePage;
use crate::types::{SearchQuery, VenueRecord};

use super::fetch::Fetcher;

/// Outcome of one refinement.
///
/// A cell counts as saturated when the API returned `limit` venues for it,
/// counted before "Moving Target" venues are dropped. A full page with one
/// noise venue in it is still split, even though `venues` holds one fewer
/// record for that cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Refinement {
    /// Leaf-cell venues concatenated in depth, then grid order. May hold
    /// duplicates where neighbouring circles overlap.
    pub venues: Vec<VenueRecord>,
    /// Radius used for the depth-0 query.
    pub radius_m: f64,
    /// Deepest level that was queried.
    pub depth_reached: u32,
    /// Requests that succeeded, over all depths.
    pub queries: usize,
    /// Cells still saturated at `max_depth`; their results may be incomplete.
    pub truncated: Vec<Cell>,
}

impl Refinement {
    pub fn is_truncated(&self) -> bool {
        !self.truncated.is_empty()
    }

    /// Venues with repeated ids removed, first occurrence kept.
    pub fn unique_venues(&self) -> Vec<VenueRecord> {
        let mut seen = HashSet::with_capacity(self.venues.len());
        self.venues
            .iter()
            .filter(|v| seen.insert(v.id.as_str()))
            .cloned()
            .collect()
    }
}

/// Refine with default retry and subdivision settings and no progress reporting.
///
/// Saturation is judged on the count the API returned, before noise
/// filtering (see [`Refinement`]). A cell that runs out of retries ends the
/// run with [`ScrapeError::Interrupted`], which keeps the venues gathered so
/// far and the cells left to query.
pub fn refine<A: VenueApi + ?Sized>(
    api: &A,
    bbox: &BoundingBox,
    category_id: &str,
    limit: u32,
) -> Result<Refinement, ScrapeError> {
    let fetcher = Fetcher::new(api, RetryPolicy::default());
    GridRefiner::new(fetcher, RefineOptions::with_limit(limit)).refine(bbox, category_id, &mut NullProgress)
}

pub struct GridRefiner<'a, A: VenueApi + ?Sized> {
    fetcher: Fetcher<'a, A>,
    opts: RefineOptions,
}

struct CellPage {
    cell: Cell,
    page: VenuePage,
}

/// Pages fetched at one depth in cell order, and the cell whose error
/// stopped the depth early.
struct DepthFetch {
    pages: Vec<CellPage>,
    error: Option<(Cell, ScrapeError)>,
}

enum WorkerMsg {
    Retry { attempt: u32, reason: String },
    Done { idx: usize, result: Result<VenuePage, ScrapeError> },
}

/// Forwards retry signals from a worker thread to the caller's progress sink.
struct ForwardRetries(mpsc::Sender<WorkerMsg>);

impl Progress for ForwardRetries {
    fn retry(&mut self, attempt: u32, reason: &str) {
        let _ = self.0.send(WorkerMsg::Retry { attempt, reason: reason.to_string() });
    }
}

impl<'a, A: VenueApi + ?Sized> GridRefiner<'a, A> {
    pub fn new(fetcher: Fetcher<'a, A>, opts: RefineOptions) -> Self {
        Self { fetcher, opts }
    }

    pub fn options(&self) -> &RefineOptions {
        &self.opts
    }

    pub fn refine(
        &self,
        bbox: &BoundingBox,
        category_id: &str,
        progress: &mut dyn Progress,
    ) -> Result<Refinement, ScrapeError> {
        self.opts.validate().map_err(ScrapeError::InvalidOptions)?;
        let out = self.run(bbox, category_id, progress);
        progress.finish();
        out
    }

    fn run(
        &self,
        bbox: &BoundingBox,
        category_id: &str,
        progress: &mut dyn Progress,
    ) -> Result<Refinement, ScrapeError> {
        let limit = self.opts.limit as usize;
        let radius = bbox.search_radius();
        info!(
            north = bbox.north(), east = bbox.east(), south = bbox.south(), west = bbox.west(),
            category = category_id, limit, radius_m = radius, "refining"
        );

        let mut venues = Vec::new();
        let mut truncated = Vec::new();
        let mut queries = 0usize;
        let mut depth = 0u32;
        let mut cells = vec![Cell::ROOT];

        loop {
            let DepthFetch { pages, error } = self.fetch_depth(bbox, radius, category_id, depth, &cells, progress);
            queries += pages.len();

            let unfetched: Vec<Cell> = match error {
                Some(_) => {
                    let done: HashSet<Cell> = pages.iter().map(|p| p.cell).collect();
                    cells.iter().copied().filter(|c| !done.contains(c)).collect()
                }
                None => Vec::new(),
            };

            let at_ceiling = depth >= self.opts.max_depth;
            let mut next = Vec::new();

            match self.opts.policy {
                SubdivisionPolicy::PerCell => {
                    for CellPage { cell, page } in pages {
                        let saturated = page.returned >= limit;
                        if saturated && !at_ceiling {
                            next.extend(cell.children());
                            continue;
                        }
                        if saturated {
                            truncated.push(cell);
                        }
                        venues.extend(page.venues);
                    }
                }
                SubdivisionPolicy::GlobalMax => {
                    let max = pages.iter().map(|f| f.page.returned).max().unwrap_or(0);
                    if error.is_none() && max >= limit && !at_ceiling {
                        next.extend(Cell::grid(depth + 1));
                    } else {
                        for CellPage { cell, page } in pages {
                            if at_ceiling && page.returned >= limit {
                                truncated.push(cell);
                            }
                            venues.extend(page.venues);
                        }
                    }
                }
            }

            if let Some((failed_cell, err)) = error {
                let failed = match err {
                    ScrapeError::Exhausted(failed) => failed,
                    other => return Err(other),
                };
                let mut pending = unfetched;
                pending.extend(next);
                pending.sort_unstable();
                warn!(
                    ?failed_cell,
                    kept = venues.len(),
                    pending = pending.len(),
                    "refinement interrupted"
                );
                let partial = Refinement { venues, radius_m: radius, depth_reached: depth, queries, truncated };
                return Err(ScrapeError::Interrupted(Box::new(Interrupted {
                    failed,
                    failed_cell,
                    partial,
                    pending,
                })));
            }

            if next.is_empty() {
                break;
            }
            next.sort_unstable();
            cells = next;
            depth += 1;
        }

        if !truncated.is_empty() {
            warn!(
                cells = truncated.len(),
                depth,
                "cells still saturated at max depth; results may be incomplete"
            );
            progress.log(&format!(
                "{} cell(s) still saturated at depth {depth}; results may be incomplete",
                truncated.len()
            ));
        }
        info!(venues = venues.len(), queries, depth, "refinement complete");

        Ok(Refinement { venues, radius_m: radius, depth_reached: depth, queries, truncated })
    }

    fn fetch_depth(
        &self,
        root: &BoundingBox,
        root_radius: f64,
        category_id: &str,
        depth: u32,
        cells: &[Cell],
        progress: &mut dyn Progress,
    ) -> DepthFetch {
        progress.depth_begin(depth, cells.len());
        if depth > 0 {
            info!(
                depth,
                cells = cells.len(),
                radius_m = root_radius / f64::from(1u32 << depth),
                "subdividing"
            );
        }

        let queries: Vec<SearchQuery> = cells
            .iter()
            .map(|&cell| SearchQuery {
                center: root.cell_bounds(cell).center(),
                radius_m: cell.radius(root_radius),
                category_id: category_id.to_string(),
                limit: self.opts.limit,
            })
            .collect();

        let workers = self.opts.workers.min(cells.len());
        if workers > 1 {
            return self.fetch_parallel(cells, &queries, workers, progress);
        }

        let mut pages = Vec::with_capacity(queries.len());
        for (&cell, q) in cells.iter().zip(&queries) {
            match self.fetcher.fetch_page(q, progress) {
                Ok(page) => {
                    debug!(?cell, returned = page.returned, kept = page.venues.len(), "cell fetched");
                    progress.cell_done(cell, page.venues.len());
                    pages.push(CellPage { cell, page });
                }
                Err(e) => return DepthFetch { pages, error: Some((cell, e)) },
            }
        }
        DepthFetch { pages, error: None }
    }

    /// Fetch one depth on a small worker pool; pages come back in `cells` order.
    /// The first error stops workers from picking up new cells and ends the
    /// retry loops of those still running.
    fn fetch_parallel(
        &self,
        cells: &[Cell],
        queries: &[SearchQuery],
        workers: usize,
        progress: &mut dyn Progress,
    ) -> DepthFetch {
        let next = AtomicUsize::new(0);
        let stop = CancelToken::new();
        let (tx, rx) = mpsc::channel::<WorkerMsg>();

        let mut slots: Vec<Option<VenuePage>> = (0..queries.len()).map(|_| None).collect();
        let mut first_err: Option<(usize, ScrapeError)> = None;

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let (next, stop) = (&next, &stop);
                scope.spawn(move || {
                    let mut forward = ForwardRetries(tx.clone());
                    loop {
                        if stop.is_cancelled() {
                            break;
                        }
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        if i >= queries.len() {
                            break;
                        }
                        let result = self.fetcher.fetch_page_until(&queries[i], &mut forward, Some(stop));
                        if tx.send(WorkerMsg::Done { idx: i, result }).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx); // main thread is sole receiver now

            for msg in rx {
                match msg {
                    WorkerMsg::Retry { attempt, reason } => progress.retry(attempt, &reason),
                    WorkerMsg::Done { idx, result: Ok(page) } => {
                        debug!(cell = ?cells[idx], returned = page.returned, "cell fetched");
                        progress.cell_done(cells[idx], page.venues.len());
                        slots[idx] = Some(page);
                    }
                    WorkerMsg::Done { idx, result: Err(e) } => {
                        stop.cancel();
                        // Later errors are mostly workers answering the stop.
                        if first_err.is_none() {
                            first_err = Some((idx, e));
                        }
                    }
                }
            }
        });

        let pages = cells
            .iter()
            .zip(slots)
            .filter_map(|(&cell, slot)| slot.map(|page| CellPage { cell, page }))
            .collect();
        DepthFetch { pages, error: first_err.map(|(idx, e)| (cells[idx], e)) }
    }
}
