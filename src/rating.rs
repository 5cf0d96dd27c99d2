use crate::tmdb::TmdbApi;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingEvent {
    Submitted { value: u8, title: String },
    Failed { message: String },
}

/// Trailing-edge debouncer for one movie's star rating. Bursts of rating
/// changes collapse into a single submission of the last value once the
/// quiet window elapses; each submission creates a fresh guest session.
pub struct Rater {
    api: Arc<dyn TmdbApi>,
    movie_id: i32,
    title: String,
    window: Duration,
    confirmed: Arc<Mutex<Option<u8>>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    events: mpsc::UnboundedSender<RatingEvent>,
}

impl Rater {
    pub fn new(
        api: Arc<dyn TmdbApi>,
        movie_id: i32,
        title: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<RatingEvent>) {
        Self::with_window(api, movie_id, title, DEBOUNCE_WINDOW)
    }

    pub fn with_window(
        api: Arc<dyn TmdbApi>,
        movie_id: i32,
        title: impl Into<String>,
        window: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<RatingEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                movie_id,
                title: title.into(),
                window,
                confirmed: Arc::new(Mutex::new(None)),
                pending: Mutex::new(None),
                events,
            },
            rx,
        )
    }

    /// The last value the remote API acknowledged, on the doubled 2-10
    /// scale. This is what the UI shows after a failed submission.
    pub fn confirmed(&self) -> Option<u8> {
        *lock(&self.confirmed)
    }

    /// Records a 1-5 star input. Supersedes any submission still waiting
    /// out the quiet window; only the last value in a burst is sent.
    pub fn rate(&self, stars: u8) {
        let stars = stars.clamp(1, 5);
        let api = self.api.clone();
        let movie_id = self.movie_id;
        let title = self.title.clone();
        let confirmed = self.confirmed.clone();
        let events = self.events.clone();
        let window = self.window;

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let value = stars * 2;
            if *lock(&confirmed) == Some(value) {
                return;
            }
            let result = async {
                let session = api.create_guest_session().await?;
                api.submit_rating(movie_id, f64::from(value), &session).await
            }
            .await;
            match result {
                Ok(()) => {
                    *lock(&confirmed) = Some(value);
                    info!(movie_id, value, "rating submitted");
                    let _ = events.send(RatingEvent::Submitted { value, title });
                }
                Err(e) => {
                    warn!(movie_id, "rating submission failed: {}", e);
                    let _ = events.send(RatingEvent::Failed {
                        message: e.to_string(),
                    });
                }
            }
        });

        let mut pending = lock(&self.pending);
        if let Some(old) = pending.replace(task) {
            old.abort();
        }
    }
}

impl Drop for Rater {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.pending).take() {
            task.abort();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
