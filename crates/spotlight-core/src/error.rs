//! Error taxonomy for the fetch-dedup-persist pipeline.
//!
//! Transfer, parse and store failures are kept apart so a fetch task can log
//! each with the right context; `FetchError` wraps them for a single market
//! iteration.

use std::path::PathBuf;
use thiserror::Error;

/// Network or HTTP status failure.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (resolve, connect, timeout, read, ...).
    #[error("GET {url}: {source}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Non-success status. Only raised when strict status handling is on.
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u32 },
}

/// Response body not well-formed or missing the expected nested fields.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("discovery envelope is not valid JSON: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("discovery response contains no items")]
    NoItems,
    #[error("item payload is not valid JSON: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("image url {0:?} has no usable path segment")]
    ImageUrl(String),
}

/// Local filesystem failure while scanning, reading or writing images.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Worker pool could not be started.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Not a single worker thread could be spawned.
    #[error("no worker thread could be spawned ({requested} requested): {source}")]
    NoWorkers {
        requested: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of one market iteration inside a fetch task.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_url_and_code() {
        let e = TransferError::Status {
            url: "https://example.com/x".to_string(),
            status: 503,
        };
        assert_eq!(e.to_string(), "GET https://example.com/x returned HTTP 503");
    }

    #[test]
    fn fetch_error_is_transparent() {
        let e: FetchError = ParseError::NoItems.into();
        assert_eq!(e.to_string(), "discovery response contains no items");
        assert!(matches!(e, FetchError::Parse(ParseError::NoItems)));
    }
}
