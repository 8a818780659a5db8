//! Error taxonomy for the data source layer.
//!
//! Every fetch-initiating operation (page load, live tick, detail view)
//! catches these at its own top level, logs them and carries on, so nothing
//! here ever reaches the terminal as a failure state.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The request never produced a response (DNS, connect, reset, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The body could not be decoded as an item record.
    #[error("unexpected payload from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FeedError {
    /// Network failures and non-success responses are both transport-level.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
