use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use daily_archive_fetcher::{ConfigOverrides, DailyArchiveFetcher, FetcherConfig};

/// Download the first matching file from a dated directory listing, one day at a time
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First day to fetch (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to fetch, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Directory the files are saved to
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Listing URL with {year}, {month} and {day} placeholders
    #[arg(long)]
    template: Option<String>,

    /// Only links ending with this suffix are downloaded
    #[arg(long)]
    suffix: Option<String>,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Extra attempts after a connection failure or 5xx response
    #[arg(long)]
    retries: Option<u32>,

    /// Pause between attempts in milliseconds
    #[arg(long)]
    retry_backoff_ms: Option<u64>,

    /// Number of days fetched in parallel
    #[arg(long)]
    workers: Option<usize>,

    /// JSON file with any of the settings above; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(self) -> Result<ConfigOverrides> {
        let from_file = match &self.config {
            Some(path) => ConfigOverrides::from_json_file(path)?,
            None => ConfigOverrides::default(),
        };

        let from_flags = ConfigOverrides {
            start: self.start,
            end: self.end,
            save_dir: self.save_dir,
            template: self.template,
            suffix: self.suffix,
            timeout_secs: self.timeout_secs,
            retries: self.retries,
            retry_backoff_ms: self.retry_backoff_ms,
            workers: self.workers,
        };

        Ok(from_flags.or(from_file))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = FetcherConfig::resolve(cli.overrides()?)?;

    println!(
        "Fetching {} days ({} to {}) from {} into {}",
        config.range.len(),
        config.range.start(),
        config.range.end(),
        config.template.as_str(),
        config.save_dir.display()
    );

    let fetcher = DailyArchiveFetcher::new(config)?;
    let summary = fetcher.run();

    println!("\n{}", summary);

    Ok(())
}
