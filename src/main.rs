// src/main.rs
mod cache;
mod dashboard;
mod extractors;
mod records;
mod source;
mod storage;
mod utils;

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use cache::TtlCache;
use dashboard::{Dashboard, DashboardOptions, Failure};
use extractors::TableExtractor;
use records::filter::{Filters, ALL_INDUSTRIES};
use records::RecordSet;
use source::{client, DEFAULT_SOURCE_URL};
use storage::{ExportManager, ExportMetadata};
use utils::error::PipelineError;
use utils::AppError;

/// Scrapes the largest US companies by revenue and shows them as a terminal dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page holding the companies table
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    url: String,

    /// Industry to show ("All" shows every industry)
    #[arg(long, default_value = ALL_INDUSTRIES)]
    industry: String,

    /// Minimum revenue in USD millions
    #[arg(long, default_value_t = 0.0)]
    min_revenue: f64,

    /// Number of entries in each ranking chart
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Export the filtered companies as CSV
    #[arg(short, long)]
    export: bool,

    /// Output directory for exports and debug dumps
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// How long scraped data stays fresh, in seconds
    #[arg(long, default_value_t = cache::DEFAULT_TTL.as_secs())]
    cache_ttl_secs: u64,

    /// Keep running and accept commands (refresh, industry, min, export, quit)
    #[arg(short, long)]
    interactive: bool,

    /// Debug mode - log data structure details and save the raw page
    #[arg(short, long)]
    debug: bool,
}

/// Fetches the page and extracts the Record Set. No partial results.
async fn scrape(url: &str, raw_dump: Option<&ExportManager>) -> Result<RecordSet, PipelineError> {
    let html = client::download_page(url).await?;
    tracing::info!("Successfully downloaded page ({} bytes)", html.len());

    if let Some(exports) = raw_dump {
        if let Err(e) = exports.save_raw_page(&html, Local::now()) {
            tracing::warn!("Failed to save raw page: {}", e);
        }
    }

    let records = TableExtractor::new().extract_record_set(&html)?;
    Ok(records)
}

struct Session {
    url: String,
    cache: TtlCache<RecordSet>,
    options: DashboardOptions,
    exports: ExportManager,
    debug: bool,
}

impl Session {
    /// Renders the dashboard from cached or freshly scraped data and
    /// returns the filtered rows on success.
    async fn render(&mut self) -> Result<RecordSet, AppError> {
        let url = self.url.as_str();
        let raw_dump = self.debug.then_some(&self.exports);

        let records = match self.cache.get_or_refresh(|| scrape(url, raw_dump)).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Scrape failed: {}", e);
                println!("{}", Failure(&e.to_string()));
                return Err(e.into());
            }
        };

        if records.is_empty() {
            tracing::warn!("Data table was found but no complete rows were extracted");
            println!("{}", Failure("The data table contained no complete rows"));
            return Err(AppError::Processing("no rows extracted".to_string()));
        }

        let filtered = self.options.filters.apply(records);

        if self.debug {
            let kinds: Vec<String> = (0..filtered.headers().len())
                .map(|i| match filtered.column_role(i) {
                    Some(role) if role.is_numeric() => format!("{:?} (numeric)", role),
                    Some(role) => format!("{:?} (text)", role),
                    None => "text".to_string(),
                })
                .collect();
            tracing::debug!("Shape: {} rows x {} columns", filtered.len(), filtered.headers().len());
            tracing::debug!("Columns: {:?}", filtered.headers());
            tracing::debug!("Column kinds: {:?}", kinds);
            tracing::debug!("First rows: {:?}", filtered.rows().iter().take(3).collect::<Vec<_>>());
        }

        println!("{}", Dashboard { records, filtered: &filtered, options: &self.options });

        if let Some(age) = self.cache.age() {
            tracing::debug!(
                "Data age: {:?} (ttl {:?}, fresh: {})",
                age,
                self.cache.ttl(),
                self.cache.is_fresh()
            );
        }
        Ok(filtered)
    }

    /// Writes the CSV export and its metadata sidecar.
    fn export(&self, filtered: &RecordSet) -> Result<PathBuf, AppError> {
        let at = Local::now();
        let path = self.exports.save_csv(filtered, at)?;

        let metadata = ExportMetadata {
            source_url: &self.url,
            row_count: filtered.len(),
            columns: filtered.headers(),
            filters: &self.options.filters,
            export_timestamp: at.to_rfc3339(),
        };
        self.exports.save_metadata(&metadata, at)?;

        println!("Exported {} companies to {}", filtered.len(), path.display());
        Ok(path)
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <enter> | show        re-render (uses cached data while fresh)");
    println!("  refresh               drop cached data and scrape again");
    println!("  industry <name|All>   filter by industry");
    println!("  min <n>               minimum revenue in USD millions");
    println!("  export                save the filtered companies as CSV");
    println!("  quit                  exit");
}

fn valid_min_revenue(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn parse_min_revenue(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| valid_min_revenue(*v))
}

async fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut last_filtered = session.render().await.ok();
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, argument) = match line.split_once(' ') {
            Some((command, rest)) => (command, Some(rest.trim())),
            None => (line, None),
        };
        tracing::debug!("Command: {:?} {:?}", command, argument);

        match (command, argument) {
            ("" | "show", _) => last_filtered = session.render().await.ok(),
            ("refresh", _) => {
                session.cache.invalidate();
                last_filtered = session.render().await.ok();
            }
            ("industry", Some(name)) => {
                session.options.filters.set_industry(name);
                last_filtered = session.render().await.ok();
            }
            ("min", Some(value)) => match parse_min_revenue(value) {
                Some(min) => {
                    session.options.filters.min_revenue = min;
                    last_filtered = session.render().await.ok();
                }
                None => println!("Minimum revenue must be a non-negative number"),
            },
            ("export", _) => match &last_filtered {
                Some(filtered) => {
                    if let Err(e) = session.export(filtered) {
                        tracing::error!("Export failed: {}", e);
                    }
                }
                None => println!("Nothing to export; refresh first"),
            },
            ("quit" | "exit", _) => break,
            ("help", _) => print_help(),
            _ => println!("Unknown command: {}", line),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting with args: {:?}", args);

    if args.top == 0 {
        return Err(AppError::Config("--top must be at least 1".to_string()));
    }
    if !valid_min_revenue(args.min_revenue) {
        return Err(AppError::Config(format!("--min-revenue must be non-negative, got {}", args.min_revenue)));
    }

    // 3. Initialize storage
    let exports = ExportManager::new(&args.output_dir)?;
    tracing::debug!("Output directory: {}", exports.base_dir().display());

    let cache = TtlCache::new(Duration::from_secs(args.cache_ttl_secs));
    tracing::debug!("Cache TTL: {:?}", cache.ttl());

    let mut session = Session {
        url: args.url,
        cache,
        options: DashboardOptions {
            filters: Filters::new(&args.industry, args.min_revenue),
            top: args.top,
        },
        exports,
        debug: args.debug,
    };

    // 4. Render once, or keep serving commands
    if args.interactive {
        return run_interactive(&mut session).await;
    }

    let filtered = session.render().await?;
    if args.export {
        session.export(&filtered)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::error::FetchError;

    // Nothing listens on port 1, so connecting fails fast.
    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/";

    fn session(output_dir: &std::path::Path) -> Session {
        Session {
            url: UNREACHABLE_URL.to_string(),
            cache: TtlCache::new(cache::DEFAULT_TTL),
            options: DashboardOptions { filters: Filters::new(ALL_INDUSTRIES, 0.0), top: 10 },
            exports: ExportManager::new(output_dir).unwrap(),
            debug: false,
        }
    }

    #[tokio::test]
    async fn scrape_reports_unreachable_host_as_network_error() {
        let err = scrape(UNREACHABLE_URL, None).await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(FetchError::Network(_))), "got {:?}", err);
    }

    #[tokio::test]
    async fn empty_record_set_is_a_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());
        session
            .cache
            .get_or_refresh(|| async { Ok::<_, PipelineError>(RecordSet::new(vec!["Name".to_string()])) })
            .await
            .unwrap();

        let result = session.render().await;
        assert!(matches!(result, Err(AppError::Processing(_))), "got {:?}", result);
        // The cached (empty) set is kept; only refresh drops it.
        assert!(session.cache.is_fresh());
    }

    #[tokio::test]
    async fn failed_fetch_is_reported_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path());

        let result = session.render().await;
        assert!(matches!(result, Err(AppError::Pipeline(PipelineError::Fetch(_)))), "got {:?}", result);
        assert!(session.cache.age().is_none());
    }
}
