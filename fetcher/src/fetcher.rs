use std::thread;

use anyhow::Result;
use chrono::NaiveDate;
use crossbeam_channel::bounded;

use crate::config::FetcherConfig;
use crate::download::{save_body, DownloadTarget};
use crate::error::FetchError;
use crate::http::{get_with_retry, HttpTransport, Transport};
use crate::io::ensure_dir;
use crate::listing::select_candidate;
use crate::outcome::{report_line, Outcome, RunSummary};

/// Walks the configured date range and fetches at most one file per day.
pub struct DailyArchiveFetcher<T = HttpTransport> {
    config: FetcherConfig,
    transport: T,
}

impl DailyArchiveFetcher<HttpTransport> {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        DailyArchiveFetcher::with_transport(config, transport)
    }
}

impl<T: Transport> DailyArchiveFetcher<T> {
    /// Creates the save directory up front; an existing one is reused.
    pub fn with_transport(config: FetcherConfig, transport: T) -> Result<Self> {
        ensure_dir(&config.save_dir)?;
        Ok(DailyArchiveFetcher { config, transport })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Processes every day in the range, printing one line per day.
    pub fn run(&self) -> RunSummary {
        self.run_with(|date, outcome| println!("{}", report_line(date, outcome)))
    }

    /// Like [`run`](Self::run) but hands each outcome to `report`.
    ///
    /// With a single worker days are handled strictly in ascending order.
    /// With more, they are reported as they complete.
    pub fn run_with<F>(&self, mut report: F) -> RunSummary
    where
        F: FnMut(NaiveDate, &Outcome),
    {
        let mut summary = RunSummary::default();
        let mut record = |date: NaiveDate, outcome: Outcome| {
            report(date, &outcome);
            summary.record(&outcome);
        };

        let workers = self.config.workers.min(self.config.range.len());
        if workers <= 1 {
            for date in self.config.range.iter() {
                record(date, self.fetch_date(date));
            }
        } else {
            let (job_tx, job_rx) = bounded::<NaiveDate>(workers);
            let (done_tx, done_rx) = bounded::<(NaiveDate, Outcome)>(workers);

            thread::scope(|scope| {
                for _ in 0..workers {
                    let job_rx = job_rx.clone();
                    let done_tx = done_tx.clone();
                    scope.spawn(move || {
                        for date in job_rx {
                            if done_tx.send((date, self.fetch_date(date))).is_err() {
                                break;
                            }
                        }
                    });
                }
                drop(done_tx);

                let range = self.config.range;
                scope.spawn(move || {
                    for date in range.iter() {
                        if job_tx.send(date).is_err() {
                            break;
                        }
                    }
                });

                for (date, outcome) in done_rx {
                    record(date, outcome);
                }
            });
        }

        summary
    }

    /// One complete attempt for a single day. Never panics on remote or
    /// local failures; they come back as the outcome.
    pub fn fetch_date(&self, date: NaiveDate) -> Outcome {
        match self.try_fetch_date(date) {
            Ok(outcome) => outcome,
            Err(error) => {
                log::debug!("{} failed: {:?}", date, error);
                Outcome::from(error)
            }
        }
    }

    fn try_fetch_date(&self, date: NaiveDate) -> Result<Outcome, FetchError> {
        // Build the listing URL for this day
        let request = self
            .config
            .template
            .request_for(date)
            .map_err(|source| FetchError::ListingUrl { date, source })?;

        // Fetch the listing page
        let listing = get_with_retry(&self.transport, &request.url, &self.config.retry)?;
        if !listing.is_ok() {
            return Ok(Outcome::ListingUnavailable(listing.status));
        }
        let html = listing.text().map_err(|source| FetchError::Body {
            url: request.url.to_string(),
            source,
        })?;

        // First matching link in document order
        let candidate = match select_candidate(&html, &self.config.suffix) {
            Some(candidate) => candidate,
            None => return Ok(Outcome::NoCandidates),
        };
        log::debug!("{}: selected {}", date, candidate);

        let target = DownloadTarget::resolve(&request.url, &candidate, &self.config.save_dir)?;

        // Fetch the file and stream it to disk
        let mut download = get_with_retry(&self.transport, &target.url, &self.config.retry)?;
        if !download.is_ok() {
            return Ok(Outcome::DownloadFailed(download.status));
        }

        let written = save_body(&mut download.body, &target)?;
        log::debug!("{}: wrote {} bytes from {}", date, written, target.url);

        Ok(Outcome::Downloaded(target.path))
    }
}
