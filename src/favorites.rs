use crate::error::Result;
use crate::models::{MovieDetail, MovieSummary};
use crate::tmdb::TmdbApi;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

#[derive(Default)]
struct Inner {
    // Insertion order is the display order.
    entries: Vec<MovieDetail>,
    ids: HashSet<i32>,
    // In-flight adds, keyed by movie id. A toggle that consumes the
    // ticket cancels the add: remove wins over a late-arriving fetch.
    pending: HashMap<i32, u64>,
    next_ticket: u64,
}

/// Session-lifetime bookmark set. Adding fetches the full detail record
/// lazily; membership checks are by movie id.
pub struct Favorites {
    api: Arc<dyn TmdbApi>,
    inner: Mutex<Inner>,
}

impl Favorites {
    pub fn new(api: Arc<dyn TmdbApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.locked().ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.locked().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().entries.is_empty()
    }

    /// Snapshot in insertion order, for display and navigation hand-off.
    pub fn as_list(&self) -> Vec<MovieDetail> {
        self.locked().entries.clone()
    }

    /// Removes the movie if present, otherwise enriches it with a detail
    /// fetch and inserts it. A second toggle while the add-fetch is in
    /// flight cancels the add, whichever finishes first.
    pub async fn toggle(&self, movie: &MovieSummary) -> Result<Toggle> {
        let ticket = {
            let mut inner = self.locked();
            if inner.ids.remove(&movie.id) {
                inner.entries.retain(|m| m.id() != movie.id);
                inner.pending.remove(&movie.id);
                debug!(movie_id = movie.id, "favorite removed");
                return Ok(Toggle::Removed);
            }
            if inner.pending.remove(&movie.id).is_some() {
                debug!(movie_id = movie.id, "pending favorite add cancelled");
                return Ok(Toggle::Removed);
            }
            inner.next_ticket += 1;
            let ticket = inner.next_ticket;
            inner.pending.insert(movie.id, ticket);
            ticket
        };

        match self.api.fetch_movie_detail(movie.id).await {
            Ok(extended) => {
                let mut inner = self.locked();
                if inner.pending.get(&movie.id) != Some(&ticket) {
                    // Removed while we were fetching.
                    return Ok(Toggle::Removed);
                }
                inner.pending.remove(&movie.id);
                inner.ids.insert(movie.id);
                inner
                    .entries
                    .push(MovieDetail::from_parts(movie.clone(), extended));
                debug!(movie_id = movie.id, "favorite added");
                Ok(Toggle::Added)
            }
            Err(e) => {
                let mut inner = self.locked();
                if inner.pending.get(&movie.id) == Some(&ticket) {
                    inner.pending.remove(&movie.id);
                }
                Err(e)
            }
        }
    }
}
