use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("input file '{}' not found", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("failed to read input file '{}': {source}", .path.display())]
    InputRead { path: PathBuf, source: io::Error },
    #[error("failed to write output file '{}': {source}", .path.display())]
    OutputWrite { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Config(String),
}

impl AppError {
    pub fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            AppError::InputNotFound { path }
        } else {
            AppError::InputRead { path, source }
        }
    }

    pub fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a single geocoder call. Never escapes the resolver.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request timed out")]
    TimedOut,
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected geocoding failure: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return GeocodeError::TimedOut;
        }
        if let Some(status) = err.status() {
            if is_unavailable_status(status) {
                return GeocodeError::Unavailable(status.to_string());
            }
        }
        if err.is_connect() {
            return GeocodeError::Unavailable(err.to_string());
        }
        GeocodeError::Unexpected(err.to_string())
    }
}

pub(crate) fn is_unavailable_status(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 502 | 503 | 504)
}
