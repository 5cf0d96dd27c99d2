use crate::cache::ResultCache;
use crate::error::Result;
use crate::models::MovieSummary;
use crate::tmdb::TmdbApi;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged; carries the number of new items.
    Fetched(usize),
    /// The fetch failed and results were replaced from the cache slot.
    Cached(usize),
    /// A load was already in flight; nothing happened.
    InFlight,
}

/// Owns the paginated result list and the active query, and decides
/// between popular browsing and search. The UI dispatches events into it
/// and renders snapshots of `results()`.
pub struct Browse {
    api: Arc<dyn TmdbApi>,
    cache: Arc<dyn ResultCache>,
    results: Vec<MovieSummary>,
    page: u32,
    query: String,
    loading: bool,
}

impl Browse {
    pub fn new(api: Arc<dyn TmdbApi>, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            api,
            cache,
            results: Vec::new(),
            page: 1,
            query: String::new(),
            loading: false,
        }
    }

    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Empty input returns to popular browsing and fetches immediately.
    /// Non-empty input stages the query for an explicit `load()` (on
    /// submit); either way the page counter resets to 1.
    pub async fn set_query(&mut self, query: &str) -> Result<Option<LoadOutcome>> {
        let trimmed = query.trim();
        self.page = 1;
        if trimmed.is_empty() {
            self.query.clear();
            self.load().await.map(Some)
        } else {
            self.query = trimmed.to_string();
            Ok(None)
        }
    }

    /// Fetches the current page. Replaces results on page 1, appends
    /// otherwise, and advances the page only when the fetch was non-empty.
    /// On fetch failure the cache slot is served instead when present.
    pub async fn load(&mut self) -> Result<LoadOutcome> {
        if self.loading {
            return Ok(LoadOutcome::InFlight);
        }
        self.loading = true;
        let outcome = self.load_inner().await;
        self.loading = false;
        outcome
    }

    /// Infinite-scroll hook: paginates while browsing popular, does
    /// nothing while a search query is active.
    pub async fn end_reached(&mut self) -> Result<Option<LoadOutcome>> {
        if self.query.is_empty() {
            self.load().await.map(Some)
        } else {
            Ok(None)
        }
    }

    async fn load_inner(&mut self) -> Result<LoadOutcome> {
        let fetched = if self.query.is_empty() {
            self.api.fetch_popular(self.page).await
        } else {
            self.api.search_movies(&self.query, self.page).await
        };

        match fetched {
            Ok(batch) => {
                let fresh = batch.len();
                if self.page == 1 {
                    self.results = batch;
                } else {
                    self.results.extend(batch);
                }
                // Best effort: a dead cache slot must not fail the load.
                if let Err(e) = self.cache.write(&self.results) {
                    warn!("failed to write cache slot: {}", e);
                }
                if fresh > 0 {
                    self.page += 1;
                }
                Ok(LoadOutcome::Fetched(fresh))
            }
            Err(e) => {
                warn!("fetch failed, trying cache slot: {}", e);
                match self.cache.read() {
                    Some(cached) => {
                        info!(count = cached.len(), "serving results from cache slot");
                        let count = cached.len();
                        self.results = cached;
                        Ok(LoadOutcome::Cached(count))
                    }
                    None => Err(e),
                }
            }
        }
    }
}
