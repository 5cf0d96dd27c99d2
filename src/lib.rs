//! UI-agnostic movie browsing, rating and favorites client for
//! TMDB-compatible metadata APIs.

pub mod browse;
pub mod cache;
pub mod error;
pub mod favorites;
pub mod models;
pub mod rating;
pub mod tmdb;

pub use error::{Error, Result};
