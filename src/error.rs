use thiserror::Error;

/// Failure kinds surfaced by the client.
///
/// The API gateway only ever returns `Network` (no usable response) or
/// `Api` (non-success response). `Store` and `Config` belong to the cache
/// slot and environment loading respectively.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
