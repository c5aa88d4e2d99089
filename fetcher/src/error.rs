use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can end a single day's attempt early.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid listing URL for {date}: {source}")]
    ListingUrl {
        date: chrono::NaiveDate,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot resolve {candidate:?} against {base}: {source}")]
    Resolve {
        base: String,
        candidate: String,
        #[source]
        source: url::ParseError,
    },

    #[error("refusing to save {candidate:?}: {reason}")]
    UnsafeFilename {
        candidate: String,
        reason: &'static str,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
