pub mod config;
pub mod date_range;
pub mod download;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod io;
pub mod listing;
pub mod outcome;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::config::{ConfigOverrides, FetcherConfig};
pub use crate::date_range::DateRange;
pub use crate::download::{DownloadTarget, CHUNK_SIZE};
pub use crate::error::FetchError;
pub use crate::fetcher::DailyArchiveFetcher;
pub use crate::http::{HttpResponse, HttpTransport, RetryPolicy, Transport};
pub use crate::listing::{extract_candidates, select_candidate, ListingRequest, ListingTemplate};
pub use crate::outcome::{report_line, Outcome, RunSummary};
