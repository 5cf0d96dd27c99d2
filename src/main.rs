use anyhow::Result;
use cinedeck::browse::{Browse, LoadOutcome};
use cinedeck::cache::JsonCache;
use cinedeck::tmdb::TmdbClient;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    init_tracing();

    let query = env::args().nth(1).unwrap_or_default();
    let pages: u32 = env::args()
        .nth(2)
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    let api = Arc::new(TmdbClient::from_env()?);
    let cache_path = env::var("CINEDECK_CACHE").unwrap_or_else(|_| "movies_cache.json".to_string());
    let cache = Arc::new(JsonCache::new(PathBuf::from(cache_path)));

    let mut browse = Browse::new(api, cache);
    let first = match browse.set_query(&query).await? {
        Some(outcome) => outcome,
        None => browse.load().await?,
    };
    report(first);

    for _ in 1..pages {
        match browse.end_reached().await? {
            Some(outcome) => report(outcome),
            // Searches do not auto-paginate past the first page.
            None => break,
        }
    }

    for movie in browse.results() {
        let rating = movie
            .vote_average
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let date = if movie.release_date.is_empty() {
            "????-??-??"
        } else {
            movie.release_date.as_str()
        };
        println!("{:>9}  {}  {:>4}  {}", movie.id, date, rating, movie.title);
    }
    info!(
        count = browse.results().len(),
        page = browse.page(),
        "done"
    );
    Ok(())
}

fn report(outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Fetched(n) => info!("fetched {} movies", n),
        LoadOutcome::Cached(n) => warn!("network unavailable, showing {} cached movies", n),
        LoadOutcome::InFlight => {}
    }
}
