// src/scrape/fetch.rs
//! One circular search, retried until it parses or the ceiling is hit.

use std::thread;

use tracing::{error, warn};

use crate::config::options::RetryPolicy;
use crate::core::{CancelToken, VenueApi};
use crate::error::{FailedQuery, ScrapeError};
use crate::progress::Progress;
use crate::specs::venues::{self, VenuePage};
use crate::types::{SearchQuery, VenueRecord};

pub struct Fetcher<'a, A: VenueApi + ?Sized> {
    api: &'a A,
    retry: RetryPolicy,
    cancel: CancelToken,
}

impl<'a, A: VenueApi + ?Sized> Fetcher<'a, A> {
    pub fn new(api: &'a A, retry: RetryPolicy) -> Self {
        Self { api, retry, cancel: CancelToken::new() }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Venues for `query`, noise already dropped.
    pub fn fetch(
        &self,
        query: &SearchQuery,
        progress: &mut dyn Progress,
    ) -> Result<Vec<VenueRecord>, ScrapeError> {
        self.fetch_page(query, progress).map(|page| page.venues)
    }

    /// Like [`fetch`](Self::fetch) but also reports how many venues the API
    /// returned before filtering, which is what saturation is measured on.
    ///
    /// Failed attempts are retried with identical parameters up to
    /// `retry.max_retries` times; after that the query comes back as
    /// [`ScrapeError::Exhausted`] so the caller can resume from it.
    pub fn fetch_page(
        &self,
        query: &SearchQuery,
        progress: &mut dyn Progress,
    ) -> Result<VenuePage, ScrapeError> {
        self.fetch_page_until(query, progress, None)
    }

    /// `stop` ends the retry loop like the fetcher's own token does, without
    /// tripping that token for later runs.
    pub(crate) fn fetch_page_until(
        &self,
        query: &SearchQuery,
        progress: &mut dyn Progress,
        stop: Option<&CancelToken>,
    ) -> Result<VenuePage, ScrapeError> {
        let mut failures: u32 = 0;
        loop {
            if self.cancel.is_cancelled() || stop.is_some_and(|s| s.is_cancelled()) {
                return Err(ScrapeError::Cancelled);
            }

            let err = match self.api.search(query).and_then(|body| venues::parse(&body)) {
                Ok(page) => return Ok(page),
                Err(e) => e,
            };

            failures += 1;
            if failures > self.retry.max_retries {
                let failed = FailedQuery {
                    query: query.clone(),
                    attempts: failures,
                    last_error: err.to_string(),
                };
                error!("{failed}");
                return Err(ScrapeError::Exhausted(failed));
            }

            warn!(
                attempt = failures,
                lat = query.center.lat,
                lng = query.center.lng,
                radius = query.radius_m,
                "search failed, retrying: {err}"
            );
            progress.retry(failures, &err.to_string());

            if !self.retry.pause.is_zero() {
                thread::sleep(self.retry.pause);
            }
        }
    }
}
