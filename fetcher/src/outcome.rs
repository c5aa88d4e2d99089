use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::FetchError;

/// How a single day ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Downloaded(PathBuf),
    NoCandidates,
    ListingUnavailable(u16),
    DownloadFailed(u16),
    Error(String),
}

impl From<FetchError> for Outcome {
    fn from(error: FetchError) -> Self {
        Outcome::Error(error.to_string())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Downloaded(path) => write!(f, "Downloaded: {}", path.display()),
            Outcome::NoCandidates => write!(f, "No matching files found"),
            Outcome::ListingUnavailable(status) => {
                write!(f, "Directory not found (HTTP {})", status)
            }
            Outcome::DownloadFailed(status) => write!(f, "Failed to download (HTTP {})", status),
            Outcome::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// The console line for one day.
pub fn report_line(date: NaiveDate, outcome: &Outcome) -> String {
    format!("{}  {}", date.format("%Y-%m-%d"), outcome)
}

/// Per-category tally over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub downloaded: usize,
    pub no_candidates: usize,
    pub listing_unavailable: usize,
    pub download_failed: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Downloaded(_) => self.downloaded += 1,
            Outcome::NoCandidates => self.no_candidates += 1,
            Outcome::ListingUnavailable(_) => self.listing_unavailable += 1,
            Outcome::DownloadFailed(_) => self.download_failed += 1,
            Outcome::Error(_) => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded
            + self.no_candidates
            + self.listing_unavailable
            + self.download_failed
            + self.errors
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} days: {} downloaded, {} without files, {} listings unavailable, {} downloads failed, {} errors",
            self.total(),
            self.downloaded,
            self.no_candidates,
            self.listing_unavailable,
            self.download_failed,
            self.errors
        )
    }
}
