use crate::error::{Error, Result};
use crate::models::{Credits, MovieExtended, MovieSummary};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE: &str = "https://api.themoviedb.org/3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl TmdbConfig {
    /// Reads `TMDB_BASE_URL`, `TMDB_API_KEY` and `TMDB_BEARER_TOKEN`.
    /// At least one credential must be present.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("TMDB_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE.to_string());
        let api_key = env::var("TMDB_API_KEY").ok().filter(|s| !s.is_empty());
        let bearer_token = env::var("TMDB_BEARER_TOKEN").ok().filter(|s| !s.is_empty());
        if api_key.is_none() && bearer_token.is_none() {
            return Err(Error::Config(
                "TMDB_API_KEY or TMDB_BEARER_TOKEN must be set".to_string(),
            ));
        }
        Ok(Self {
            base_url,
            api_key,
            bearer_token,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn fetch_popular(&self, page: u32) -> Result<Vec<MovieSummary>>;
    async fn search_movies(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>>;
    async fn fetch_movie_detail(&self, id: i32) -> Result<MovieExtended>;
    async fn create_guest_session(&self) -> Result<String>;
    async fn submit_rating(&self, movie_id: i32, value: f64, session: &str) -> Result<()>;
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TmdbConfig::from_env()?)
    }

    fn url(&self, path_query: String) -> String {
        match &self.config.api_key {
            Some(key) => {
                let sep = if path_query.contains('?') { '&' } else { '?' };
                format!("{path_query}{sep}api_key={key}")
            }
            None => path_query,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let req = match &self.config.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| Error::Api {
            status: status.as_u16(),
            message: format!("invalid response body: {e}"),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.execute(self.client.get(url)).await
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn fetch_popular(&self, page: u32) -> Result<Vec<MovieSummary>> {
        let url = self.url(format!(
            "{}/movie/popular?language=en-US&page={}",
            self.config.base_url, page
        ));
        debug!(page, "fetching popular movies");
        let data: ListResponse = self.get_json(&url).await?;
        Ok(data.results)
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>> {
        // Empty-query routing is the caller's job; this always hits /search.
        let url = self.url(format!(
            "{}/search/movie?language=en-US&query={}&page={}",
            self.config.base_url,
            urlencoding::encode(query),
            page
        ));
        debug!(query, page, "searching movies");
        let data: ListResponse = self.get_json(&url).await?;
        Ok(data.results)
    }

    async fn fetch_movie_detail(&self, id: i32) -> Result<MovieExtended> {
        let url = self.url(format!(
            "{}/movie/{}?append_to_response=credits&language=en-US",
            self.config.base_url, id
        ));
        debug!(movie_id = id, "fetching movie detail");
        let data: DetailResponse = self.get_json(&url).await?;
        Ok(data.into_extended())
    }

    async fn create_guest_session(&self) -> Result<String> {
        let url = self.url(format!(
            "{}/authentication/guest_session/new",
            self.config.base_url
        ));
        let data: GuestSessionResponse = self.get_json(&url).await?;
        Ok(data.guest_session_id)
    }

    async fn submit_rating(&self, movie_id: i32, value: f64, session: &str) -> Result<()> {
        let url = self.url(format!(
            "{}/movie/{}/rating?guest_session_id={}",
            self.config.base_url,
            movie_id,
            urlencoding::encode(session)
        ));
        debug!(movie_id, value, "submitting rating");
        let _: Ack = self
            .execute(self.client.post(&url).json(&json!({ "value": value })))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: i32,
    runtime: Option<u32>,
    budget: Option<u64>,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    credits: Credits,
}

impl DetailResponse {
    fn into_extended(self) -> MovieExtended {
        MovieExtended {
            id: self.id,
            runtime: self.runtime,
            budget: self.budget,
            overview: self.overview,
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            credits: self.credits,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuestSessionResponse {
    guest_session_id: String,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    #[allow(dead_code)]
    status_message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: String,
}

fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.status_message)
        .unwrap_or_else(|_| body.trim().to_string());
    Error::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_response_maps_genre_names() {
        let raw = r#"{
            "id": 42,
            "runtime": 120,
            "budget": 1000000,
            "overview": "A movie.",
            "genres": [{"id": 1, "name": "Action"}, {"id": 2, "name": "Drama"}],
            "credits": {
                "cast": [{"name": "A", "character": "B", "order": 0}],
                "crew": [{"name": "C", "job": "Director"}]
            }
        }"#;
        let parsed: DetailResponse = serde_json::from_str(raw).expect("detail json");
        let extended = parsed.into_extended();
        assert_eq!(extended.id, 42);
        assert_eq!(extended.runtime, Some(120));
        assert_eq!(extended.genres, vec!["Action", "Drama"]);
        assert_eq!(extended.credits.cast[0].character, "B");
        assert_eq!(extended.credits.crew[0].job, "Director");
    }

    #[test]
    fn detail_response_tolerates_missing_credits() {
        let parsed: DetailResponse =
            serde_json::from_str(r#"{"id": 7, "runtime": null, "budget": null}"#).expect("json");
        let extended = parsed.into_extended();
        assert!(extended.credits.cast.is_empty());
        assert!(extended.genres.is_empty());
    }

    #[test]
    fn api_error_prefers_status_message() {
        let err = api_error(401, r#"{"status_code":7,"status_message":"Invalid API key"}"#);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_body() {
        let err = api_error(500, "upstream exploded");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
