use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use github_scraper::config::ScraperConfig;
use github_scraper::models::{SortDirection, SortOption};
use github_scraper::search::{Scraper, SearchError};
use github_scraper::utils::{render_table, RecordStream, TableRow};
use serde::Serialize;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stream search results scraped from GitHub's HTML search pages
#[derive(Parser, Debug)]
#[command(name = "github-scraper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stream repositories, commits, issues and users from GitHub search", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    /// Last result page to request
    #[arg(long, global = true, default_value_t = 100)]
    max_pages: u32,

    /// Site base URL
    #[arg(long, global = true, default_value = github_scraper::config::DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Table on a terminal, JSON lines otherwise
    Auto,
    /// Table format (human-readable)
    Table,
    /// One JSON object per line
    Json,
    /// Plain text format
    Plain,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    Asc,
    Desc,
}

#[derive(clap::Args, Debug, Clone)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value_t = 10)]
    max_results: usize,

    /// Sort preset (e.g. most-stars, newest, recently-committed)
    #[arg(long, conflicts_with = "sort_field")]
    sort: Option<String>,

    /// Arbitrary sort field (e.g. stars, forks, updated)
    #[arg(long)]
    sort_field: Option<String>,

    /// Sort direction for --sort-field
    #[arg(long, value_enum, requires = "sort_field")]
    order: Option<Order>,
}

impl SearchArgs {
    fn sort_option(&self) -> Result<SortOption> {
        if let Some(name) = &self.sort {
            return match SortOption::preset(name) {
                Some(option) => Ok(option),
                None => {
                    let known: Vec<_> = SortOption::presets().iter().map(|(n, _)| *n).collect();
                    bail!("Unknown sort preset '{}'. Known presets: {}", name, known.join(", "))
                }
            };
        }

        Ok(match &self.sort_field {
            Some(field) => {
                let direction = match self.order {
                    Some(Order::Asc) => SortDirection::Ascending,
                    Some(Order::Desc) => SortDirection::Descending,
                    None => SortDirection::Unspecified,
                };
                SortOption::new(field.clone(), direction)
            }
            None => SortOption::DEFAULT,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search repositories
    Repositories(SearchArgs),
    /// Search commits
    Commits(SearchArgs),
    /// Search issues and pull requests
    Issues(SearchArgs),
    /// Search users (organizations are skipped)
    Users(SearchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("github_scraper={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ScraperConfig::default()
        .base_url(cli.base_url.as_str())
        .request_timeout_secs(cli.timeout)
        .max_pages(cli.max_pages);
    let scraper = Scraper::with_config(config)?;
    let format = resolve_format(cli.output);

    match &cli.command {
        Commands::Repositories(args) => {
            let stream =
                scraper.search_repositories(args.sort_option()?, &args.query, args.max_results);
            output_stream(stream, format).await
        }
        Commands::Commits(args) => {
            let stream = scraper.search_commits(args.sort_option()?, &args.query, args.max_results);
            output_stream(stream, format).await
        }
        Commands::Issues(args) => {
            let stream = scraper.search_issues(args.sort_option()?, &args.query, args.max_results);
            output_stream(stream, format).await
        }
        Commands::Users(args) => {
            let stream = scraper.search_users(args.sort_option()?, &args.query, args.max_results);
            output_stream(stream, format).await
        }
    }
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

/// Print records as they arrive (JSON, plain) or once complete (table).
async fn output_stream<T>(mut stream: RecordStream<T>, format: OutputFormat) -> Result<()>
where
    T: Serialize + TableRow,
{
    let mut buffered = Vec::new();
    let mut failure: Option<SearchError> = None;

    while let Some(item) = stream.next().await {
        let record = match item {
            Ok(record) => record,
            Err(e) if e.is_cap_reached() => break,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&record)?),
            OutputFormat::Plain => println!("{}", record.cells().join("\t")),
            _ => buffered.push(record),
        }
    }

    if !buffered.is_empty() {
        println!("{}", render_table(&buffered));
    }

    match failure {
        Some(e) => {
            eprintln!("Search stopped after {} results: {}", stream.received(), e);
            Err(e.into())
        }
        None => Ok(()),
    }
}
