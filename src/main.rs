use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reels_harvest::config::Config;
use reels_harvest::export::write_csv_file;
use reels_harvest::{
    compute_stats, parse_file, PostCollector, PostRecord, ReplaySession, SelectorTable, Sweeper,
};

#[derive(Parser)]
#[command(name = "reels-harvest")]
#[command(about = "Extract reel engagement counters from captured pages into CSV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one saved page (static mode)
    Parse {
        /// Saved HTML of the page
        file: PathBuf,

        /// Output CSV (default: parsed_reels_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON selector table overriding the built-in one
        #[arg(long)]
        selectors: Option<PathBuf>,
    },

    /// Replay snapshots captured across scrolls of a live session
    Replay {
        /// Glob matching the snapshot files, replayed in path order
        pattern: String,

        /// Output CSV (default: OUTPUT_FILE or scraped_reels.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum scrolls (default: MAX_SCROLLS or 50)
        #[arg(long)]
        max_scrolls: Option<usize>,

        /// JSON selector table overriding the built-in one
        #[arg(long)]
        selectors: Option<PathBuf>,
    },

    /// Print the built-in selector table as JSON
    Selectors,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse(), Config::from_env) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Ok(false) means the run finished but produced nothing worth writing.
/// Configuration is only loaded by the subcommands that use it.
fn run(cli: Cli, load_config: impl Fn() -> Result<Config>) -> Result<bool> {
    match cli.command {
        Commands::Parse {
            file,
            output,
            selectors,
        } => {
            let config = load_config()?;
            cmd_parse(&config, &file, output, selectors)
        }
        Commands::Replay {
            pattern,
            output,
            max_scrolls,
            selectors,
        } => {
            let config = load_config()?;
            cmd_replay(&config, &pattern, output, max_scrolls, selectors)
        }
        Commands::Selectors => {
            println!("{}", SelectorTable::default().to_json_pretty()?);
            Ok(true)
        }
    }
}

fn collector_for(config: &Config, selectors: Option<&PathBuf>) -> Result<PostCollector> {
    let table = config.load_selector_table(selectors)?;
    PostCollector::from_table(&table)
        .with_context(|| format!("selector table {} is invalid", table.version))
}

fn cmd_parse(
    config: &Config,
    file: &Path,
    output: Option<PathBuf>,
    selectors: Option<PathBuf>,
) -> Result<bool> {
    let collector = collector_for(config, selectors.as_ref())?;
    let collection =
        parse_file(file, &collector).with_context(|| format!("parsing {}", file.display()))?;

    println!("Total reel links found: {}", collection.anchors_seen());

    if collection.is_empty() {
        warn!(
            path = %file.display(),
            "no reels found; check that the page was fully loaded and the complete HTML was saved"
        );
        return Ok(false);
    }

    let records = collection.into_records();
    print_parsing_stats(&records);

    let output = output.unwrap_or_else(timestamped_output);
    write_csv_file(&output, &records, &config.base_url)?;
    print_sample(&records, 5);
    println!("Data saved to: {}", output.display());
    Ok(true)
}

fn cmd_replay(
    config: &Config,
    pattern: &str,
    output: Option<PathBuf>,
    max_scrolls: Option<usize>,
    selectors: Option<PathBuf>,
) -> Result<bool> {
    let collector = collector_for(config, selectors.as_ref())?;
    let mut session = ReplaySession::from_pattern(pattern)
        .with_context(|| format!("collecting snapshots matching {pattern}"))?;
    info!(snapshots = session.snapshot_count(), "replaying captured session");

    let max_scrolls = max_scrolls.unwrap_or(config.max_scrolls);
    let report = Sweeper::new(&collector, max_scrolls).run(&mut session)?;

    if report.records.is_empty() {
        warn!("no reels found; the layout or selectors may have changed");
        return Ok(true);
    }

    let stats = &report.stats;
    println!("Scraping statistics:");
    println!("  Total reels found:  {}", stats.total_found);
    println!("  Unique reels:       {}", stats.unique_posts);
    println!("  Duplicates removed: {}", stats.duplicates_removed);
    println!("  Scrolls performed:  {}", stats.sweeps_performed);
    print_parsing_stats(&report.records);

    let output = output.unwrap_or_else(|| config.output_file.clone());
    write_csv_file(&output, &report.records, &config.base_url)?;
    print_sample(&report.records, 3);
    println!("Results saved to: {}", output.display());
    Ok(true)
}

fn timestamped_output() -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("parsed_reels_{secs}.csv"))
}

fn print_parsing_stats(records: &[PostRecord]) {
    let stats = compute_stats(records);
    println!("Parsing statistics:");
    println!("  Total reels:              {}", stats.total);
    println!("  Reels with view counts:   {}", stats.with_views);
    println!("  Reels without view counts: {}", stats.without_views);
    println!("  Reels with complete data: {}", stats.complete);
    println!("  Unique users:             {}", stats.unique_authors);
    println!("  Average view count:       {}", stats.average_views);
}

fn print_sample(records: &[PostRecord], limit: usize) {
    println!("Sample extracted data:");
    for (index, record) in records.iter().take(limit).enumerate() {
        println!(
            "  {}. {} - {} views | {} likes | {} comments",
            index + 1,
            record.author.as_deref().unwrap_or("Unknown"),
            record.views,
            record.likes,
            record.comments
        );
        println!("     {}", record.link);
    }
    if records.len() > limit {
        println!("  ... and {} more reels", records.len() - limit);
    }
}
