use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/200x300?text=No+Image";

/// Lightweight listing record. Equality is by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

impl PartialEq for MovieSummary {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MovieSummary {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// Enrichment fetched on demand for a single movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieExtended {
    pub id: i32,
    pub runtime: Option<u32>,
    pub budget: Option<u64>,
    pub overview: String,
    pub genres: Vec<String>,
    pub credits: Credits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    pub summary: MovieSummary,
    pub extended: MovieExtended,
}

impl MovieDetail {
    /// Merges a listing record with its detail fetch. The two must refer to
    /// the same movie; nothing beyond identifier equality is enforced.
    pub fn from_parts(summary: MovieSummary, extended: MovieExtended) -> Self {
        debug_assert_eq!(summary.id, extended.id);
        Self { summary, extended }
    }

    pub fn id(&self) -> i32 {
        self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }
}

static GENRES: Lazy<HashMap<i32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (28, "Action"),
        (12, "Adventure"),
        (16, "Animation"),
        (35, "Comedy"),
        (80, "Crime"),
        (99, "Documentary"),
        (18, "Drama"),
        (10751, "Family"),
        (14, "Fantasy"),
        (36, "History"),
        (27, "Horror"),
        (10402, "Music"),
        (9648, "Mystery"),
        (10749, "Romance"),
        (878, "Science Fiction"),
        (10770, "TV Movie"),
        (53, "Thriller"),
        (10752, "War"),
        (37, "Western"),
    ])
});

pub fn genre_name(id: i32) -> Option<&'static str> {
    GENRES.get(&id).copied()
}

pub fn genre_names(ids: &[i32]) -> Vec<&'static str> {
    ids.iter().filter_map(|id| genre_name(*id)).collect()
}

/// Image URL for the given poster path and size segment (`w200`, `w500`,
/// `original`, ...). Missing posters resolve to a placeholder.
pub fn poster_url(path: Option<&str>, size: &str) -> String {
    match path {
        Some(p) => format!("{IMAGE_BASE}/{size}{p}"),
        None => PLACEHOLDER_POSTER.to_string(),
    }
}

/// Plain-text share message for the host platform's sharing facility.
pub fn share_text(movie: &MovieSummary) -> String {
    let genres = genre_names(&movie.genre_ids).join(", ");
    let genres = if genres.is_empty() {
        "Unknown".to_string()
    } else {
        genres
    };
    let release = if movie.release_date.is_empty() {
        "N/A"
    } else {
        movie.release_date.as_str()
    };
    let rating = movie
        .vote_average
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "{}\n\nGenre(s): {}\nRelease Date: {}\nRating: {}",
        movie.title, genres, release, rating
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i32, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some("/abc.jpg".to_string()),
            release_date: "2024-05-01".to_string(),
            vote_average: Some(7.24),
            genre_ids: vec![28, 12],
        }
    }

    #[test]
    fn merge_exposes_both_halves() {
        let extended = MovieExtended {
            id: 42,
            runtime: Some(120),
            budget: None,
            overview: String::new(),
            genres: vec!["Action".to_string()],
            credits: Credits::default(),
        };
        let detail = MovieDetail::from_parts(summary(42, "X"), extended);
        assert_eq!(detail.id(), 42);
        assert_eq!(detail.title(), "X");
        assert_eq!(detail.extended.runtime, Some(120));
        assert_eq!(detail.extended.genres, vec!["Action"]);
    }

    #[test]
    fn share_text_full() {
        let m = summary(1, "Heat");
        assert_eq!(
            share_text(&m),
            "Heat\n\nGenre(s): Action, Adventure\nRelease Date: 2024-05-01\nRating: 7.2"
        );
    }

    #[test]
    fn share_text_missing_fields() {
        let m = MovieSummary {
            id: 2,
            title: "Obscure".to_string(),
            poster_path: None,
            release_date: String::new(),
            vote_average: None,
            genre_ids: vec![],
        };
        assert_eq!(
            share_text(&m),
            "Obscure\n\nGenre(s): Unknown\nRelease Date: N/A\nRating: N/A"
        );
    }

    #[test]
    fn poster_urls() {
        assert_eq!(
            poster_url(Some("/abc.jpg"), "w200"),
            "https://image.tmdb.org/t/p/w200/abc.jpg"
        );
        assert_eq!(poster_url(None, "w200"), PLACEHOLDER_POSTER);
    }

    #[test]
    fn unknown_genre_ids_are_skipped() {
        assert_eq!(genre_names(&[28, 99999]), vec!["Action"]);
    }

    #[test]
    fn summary_deserializes_with_missing_optionals() {
        let m: MovieSummary =
            serde_json::from_str(r#"{"id": 7, "title": "Bare"}"#).expect("minimal summary");
        assert_eq!(m.id, 7);
        assert!(m.release_date.is_empty());
        assert!(m.genre_ids.is_empty());
        assert!(m.vote_average.is_none());
    }
}
