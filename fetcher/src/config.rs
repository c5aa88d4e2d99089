use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::date_range::DateRange;
use crate::http::RetryPolicy;
use crate::listing::{ListingTemplate, DEFAULT_TEMPLATE};

pub const DEFAULT_SUFFIX: &str = ".mp4";
pub const DEFAULT_SAVE_DIR: &str = "Solar";

/// Optional settings, as read from a JSON file or collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub save_dir: Option<PathBuf>,
    pub template: Option<String>,
    pub suffix: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub workers: Option<usize>,
}

impl ConfigOverrides {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config JSON from {}", path.display()))
    }

    /// Values set in `self` win over those in `lower`.
    pub fn or(self, lower: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            start: self.start.or(lower.start),
            end: self.end.or(lower.end),
            save_dir: self.save_dir.or(lower.save_dir),
            template: self.template.or(lower.template),
            suffix: self.suffix.or(lower.suffix),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
            retries: self.retries.or(lower.retries),
            retry_backoff_ms: self.retry_backoff_ms.or(lower.retry_backoff_ms),
            workers: self.workers.or(lower.workers),
        }
    }
}

/// Everything the fetcher needs, fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub range: DateRange,
    pub template: ListingTemplate,
    pub save_dir: PathBuf,
    pub suffix: String,
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub workers: usize,
}

impl FetcherConfig {
    /// Fills unset values with the defaults and validates the result.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let start = match overrides.start {
            Some(date) => date,
            None => default_date(2024, 1, 1)?,
        };
        let end = match overrides.end {
            Some(date) => date,
            None => default_date(2024, 12, 31)?,
        };
        let range = DateRange::new(start, end)?;

        let template = ListingTemplate::parse(
            overrides.template.as_deref().unwrap_or(DEFAULT_TEMPLATE),
        )?;

        let suffix = overrides
            .suffix
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
        ensure!(!suffix.is_empty(), "File suffix must not be empty");

        let workers = overrides.workers.unwrap_or(1);
        ensure!(workers >= 1, "Worker count must be at least 1");

        if let Some(secs) = overrides.timeout_secs {
            ensure!(secs > 0, "Timeout must be at least 1 second; omit it for no timeout");
        }

        Ok(FetcherConfig {
            range,
            template,
            save_dir: overrides
                .save_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR)),
            suffix,
            timeout: overrides.timeout_secs.map(Duration::from_secs),
            retry: RetryPolicy {
                retries: overrides.retries.unwrap_or(0),
                backoff: Duration::from_millis(overrides.retry_backoff_ms.unwrap_or(0)),
            },
            workers,
        })
    }
}

fn default_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("Invalid default date")
}
