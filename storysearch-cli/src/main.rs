//! storysearch CLI - Command-line interface
//!
//! Runs paged story searches against a JSON fixture file through the
//! storysearch dispatcher, optionally cancelling some of them, and prints
//! every delivered result.

mod error;
mod fixtures;
mod runner;
mod search;

use clap::Parser;
use error::CliError;
use fixtures::FixtureRepository;
use runner::CliRunner;
use search::{render, run_search, SearchPlan};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "storysearch")]
#[command(version = storysearch::VERSION)]
#[command(about = "Search stories with keyed, cancellable requests", long_about = None)]
struct Args {
    /// JSON file holding an array of raw stories
    #[arg(long)]
    fixtures: PathBuf,

    /// Query to search (repeatable)
    #[arg(long = "query", short = 'q', required = true)]
    queries: Vec<String>,

    /// Pages to request per query
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Cancel the request for a source in `query::page` form (repeatable)
    #[arg(long)]
    cancel: Vec<String>,

    /// Cancel every request right after dispatching
    #[arg(long)]
    cancel_all: bool,

    /// Simulated repository latency in milliseconds (overrides config)
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Config file to use instead of ~/.storysearch/config.ini
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        e.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.debug)?;
    runner.log_startup();

    let fixtures = &runner.config().fixtures;
    let latency = Duration::from_millis(args.latency_ms.unwrap_or(fixtures.latency_ms));
    let repository = FixtureRepository::load(&args.fixtures, fixtures.page_size, latency)?;
    tracing::info!(
        stories = repository.story_count(),
        page_size = fixtures.page_size,
        latency_ms = latency.as_millis() as u64,
        "Fixture repository ready"
    );

    let plan = SearchPlan {
        queries: args.queries,
        pages: args.pages,
        cancel: args.cancel,
        cancel_all: args.cancel_all,
    };
    let report = run_search(repository, runner.dispatcher_config(), &plan).await;

    print!("{}", render(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_repeatable_flags() {
        let args = Args::try_parse_from([
            "storysearch",
            "--fixtures",
            "stories.json",
            "-q",
            "rust",
            "--query",
            "go",
            "--pages",
            "3",
            "--cancel",
            "rust::2",
            "--cancel-all",
        ])
        .unwrap();

        assert_eq!(args.queries, vec!["rust", "go"]);
        assert_eq!(args.pages, 3);
        assert_eq!(args.cancel, vec!["rust::2"]);
        assert!(args.cancel_all);
        assert_eq!(args.latency_ms, None);
    }

    #[test]
    fn test_pages_must_be_positive() {
        let result = Args::try_parse_from([
            "storysearch",
            "--fixtures",
            "stories.json",
            "-q",
            "rust",
            "--pages",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_is_required() {
        assert!(Args::try_parse_from(["storysearch", "--fixtures", "stories.json"]).is_err());
    }
}
