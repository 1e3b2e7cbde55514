use serde::Serialize;
use thiserror::Error;

/// Классы сбоев конвейера. Фатален только `BrowserLaunchFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    NavigationTimeout,
    SelectorNotFound,
    DetailFetchFailed,
    TotalExtractionEmpty,
    BrowserLaunchFailed,
}

impl FailureKind {
    pub fn is_fatal(self) -> bool {
        matches!(self, FailureKind::BrowserLaunchFailed)
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("page evaluation failed: {0}")]
    Evaluation(String),

    #[error("cache error: {0}")]
    Cache(String),
}

impl ScrapeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ScrapeError::BrowserLaunch(_) => FailureKind::BrowserLaunchFailed,
            ScrapeError::Navigation { .. } | ScrapeError::Evaluation(_) | ScrapeError::Cache(_) => {
                FailureKind::DetailFetchFailed
            }
        }
    }
}

impl From<redis::RedisError> for ScrapeError {
    fn from(err: redis::RedisError) -> Self {
        ScrapeError::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::Cache(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}
