// src/cli.rs
use std::io::{self, Write};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Report, WrapErr};
use color_eyre::Section;

use crate::config::consts::*;
use crate::config::options::{ApiOptions, RefineOptions, RetryPolicy, SubdivisionPolicy};
use crate::core::{BoundingBox, Cell, HttpApi};
use crate::csv::{self, Delim};
use crate::error::ScrapeError;
use crate::log::{self, LogTarget};
use crate::progress::Progress;
use crate::scrape::{self, Fetcher, GridRefiner};
use crate::store::DataSet;

#[derive(Parser, Debug)]
#[command(name = "venue_scrape", version, about = "Grid-refining Foursquare venue scraper")]
pub struct Cli {
    #[arg(long, env = "FOURSQUARE_CLIENT_ID", hide_env_values = true)]
    client_id: String,

    #[arg(long, env = "FOURSQUARE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// API version date sent as `v`
    #[arg(long, default_value = API_VERSION)]
    api_version: String,

    #[arg(long, default_value = API_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    timeout: u64,

    /// Log to .store/debug.log instead of stderr
    #[arg(long)]
    log_file: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv, global = true)]
    format: Format,

    /// Omit the header line
    #[arg(long, global = true)]
    no_headers: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every venue of one category inside a bounding box
    Venues(VenuesArgs),
    /// Fetch and flatten the category taxonomy
    Categories,
}

#[derive(Args, Debug)]
struct VenuesArgs {
    #[arg(long, allow_negative_numbers = true)]
    north: f64,
    #[arg(long, allow_negative_numbers = true)]
    east: f64,
    #[arg(long, allow_negative_numbers = true)]
    south: f64,
    #[arg(long, allow_negative_numbers = true)]
    west: f64,

    /// Category id to search for
    #[arg(long)]
    category: String,

    /// Per-query result cap
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,

    #[arg(long, default_value_t = MAX_DEPTH)]
    max_depth: u32,

    #[arg(long, value_enum, default_value_t = Policy::PerCell)]
    policy: Policy,

    /// Cells fetched concurrently within a depth
    #[arg(long, default_value_t = WORKERS)]
    workers: usize,

    #[arg(long, default_value_t = MAX_RETRIES)]
    retries: u32,

    /// Pause between retries in milliseconds
    #[arg(long, default_value_t = RETRY_PAUSE_MS)]
    retry_pause_ms: u64,

    /// Drop repeated venue ids
    #[arg(long)]
    unique: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Tsv,
}

impl From<Format> for Delim {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => Delim::Csv,
            Format::Tsv => Delim::Tsv,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    PerCell,
    GlobalMax,
}

impl From<Policy> for SubdivisionPolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::PerCell => SubdivisionPolicy::PerCell,
            Policy::GlobalMax => SubdivisionPolicy::GlobalMax,
        }
    }
}

/// Progress lines on stderr; stdout is reserved for the table.
struct StderrProgress {
    depth: u32,
    done: usize,
    total: usize,
}

impl Progress for StderrProgress {
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
    fn depth_begin(&mut self, depth: u32, cells: usize) {
        self.depth = depth;
        self.done = 0;
        self.total = cells;
        if depth > 0 {
            let side = 1u32 << depth;
            eprintln!("Dividing: depth {depth} ({side}x{side} grid, {cells} cells)");
        }
    }
    fn cell_done(&mut self, cell: Cell, found: usize) {
        self.done += 1;
        eprintln!(
            "Fetched cell r{} c{} at depth {}: {found} venues ({}/{})",
            cell.row, cell.col, self.depth, self.done, self.total
        );
    }
    fn retry(&mut self, attempt: u32, reason: &str) {
        eprintln!("Failed, retry {attempt}: {reason}");
    }
}

pub fn run() -> color_eyre::Result<()> {
    let cli = Cli::parse();

    let target = if cli.log_file { LogTarget::File } else { LogTarget::Stderr };
    log::init(target).wrap_err("could not set up logging")?;

    let mut opts = ApiOptions::new(cli.client_id, cli.client_secret);
    opts.version = cli.api_version;
    opts.base_url = cli.base_url;
    opts.timeout = Duration::from_secs(cli.timeout);
    let api = HttpApi::new(opts).wrap_err("could not build HTTP client")?;

    let (dataset, interrupted) = match cli.command {
        Command::Venues(args) => venues(&api, args)?,
        Command::Categories => {
            let rows = scrape::fetch_taxonomy(&api).wrap_err("category request failed")?;
            (DataSet::from_categories(&rows), None)
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    csv::write_dataset(&mut out, &dataset, !cli.no_headers, cli.format.into())?;
    out.flush()?;

    // Partial rows are already on stdout; the exit status still reports failure.
    match interrupted {
        Some(report) => Err(report),
        None => Ok(()),
    }
}

/// The venue table, plus the error to exit with when a cell gave up. In that
/// case the table holds what was gathered before the failure.
fn venues(api: &HttpApi, args: VenuesArgs) -> color_eyre::Result<(DataSet, Option<Report>)> {
    let bbox = BoundingBox::new(args.north, args.east, args.south, args.west)?;

    let retry = RetryPolicy {
        max_retries: args.retries,
        pause: Duration::from_millis(args.retry_pause_ms),
    };
    let opts = RefineOptions {
        limit: args.limit,
        max_depth: args.max_depth,
        policy: args.policy.into(),
        workers: args.workers,
    };
    let refiner = GridRefiner::new(Fetcher::new(api, retry), opts);

    let mut progress = StderrProgress { depth: 0, done: 0, total: 0 };
    let (refinement, interrupted) = match refiner.refine(&bbox, &args.category, &mut progress) {
        Ok(r) => (r, None),
        Err(ScrapeError::Interrupted(int)) => {
            let q = &int.failed.query;
            let hint = format!(
                "resume from lat={} lng={} radius={} category={}; {} cell(s) pending",
                q.center.lat,
                q.center.lng,
                q.radius_m,
                q.category_id,
                int.pending.len()
            );
            let report = eyre!("{int}").suggestion(hint);
            (int.partial, Some(report))
        }
        Err(e) => return Err(e.into()),
    };

    let venues = if args.unique { refinement.unique_venues() } else { refinement.venues };
    eprintln!("{} venues from {} queries", venues.len(), refinement.queries);
    Ok((DataSet::from_venues(&venues), interrupted))
}
