//! CLI binary for warsaw-minpoints.
//!
//! Run with no arguments to download the PDF, convert it and write
//! `data/schools-2025.json`. The `query` subcommand reads that JSON back and
//! prints a filtered, sorted table.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use warsaw_minpoints::query::{self, Page, RowFilter, SortMode, PAGE_SIZE};
use warsaw_minpoints::{
    extract, extract_from_text, load_rows, ExtractConfig, ExtractOutput, ExtractProgressCallback,
    FetchBackend, ProgressCallback, Row, Stage, DEFAULT_PDF_URL,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner naming the running stage, plus one log line
/// per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<16} {}",
            green("✓"),
            stage.label(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        self.bar.finish_and_clear();
        // Keep only the first line; the full error (with captured streams)
        // is printed by main on exit.
        let first_line = error.lines().next().unwrap_or_default();
        eprintln!("  {} {:<16} {}", red("✗"), stage.label(), red(first_line));
    }

    fn on_extract_complete(&self, rows: usize, skipped: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} rows parsed  {}",
            green("✔"),
            bold(&rows.to_string()),
            dim(&format!("({skipped} lines skipped)"))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Full run with defaults (download, convert, parse, write data/schools-2025.json)
  minpoints

  # Pretty JSON to a custom path
  minpoints --pretty -o site/public/data/schools-2025.json

  # Re-parse an existing pdftotext dump without downloading
  minpoints --from-text data/source.txt

  # Download in-process instead of calling curl
  minpoints --fetcher http --download-timeout 60

  # Top thresholds in Mokotów, including profiles without data
  minpoints query --district Mokotów --sort points-desc --include-no-data

  # Search across school, profile, symbol and district
  minpoints query --search informatyk --min 150

  # Second page of 25 results
  minpoints query --sort points-desc --page 2

REQUIREMENTS:
  curl        used by the default fetcher
  pdftotext   from poppler-utils; converts the PDF with -layout -nopgbrk

ENVIRONMENT VARIABLES:
  RUST_LOG               Override log filter (e.g. warsaw_minpoints=debug)
  MINPOINTS_URL          PDF URL
  MINPOINTS_DATA_DIR     Working directory for PDF, text dump and JSON
  MINPOINTS_OUTPUT       Output JSON path
"#;

/// Convert the Warsaw minimum-admission-points PDF into JSON.
#[derive(Parser, Debug)]
#[command(
    name = "minpoints",
    version,
    about = "Convert the Warsaw minimum-admission-points PDF into JSON",
    long_about = "Download the City of Warsaw's PDF listing the minimum points of qualified \
candidates, convert it with pdftotext and parse every table row into JSON. With no \
arguments the canonical run is performed.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    extract: ExtractArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MINPOINTS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "MINPOINTS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter and sort rows from a previously written JSON file.
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL of the PDF document.
    #[arg(long, env = "MINPOINTS_URL", default_value = DEFAULT_PDF_URL)]
    url: String,

    /// Directory for the downloaded PDF and the text dump.
    #[arg(long, env = "MINPOINTS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Output JSON path [default: <data-dir>/schools-2025.json].
    #[arg(short, long, env = "MINPOINTS_OUTPUT")]
    output: Option<PathBuf>,

    /// How to download the PDF.
    #[arg(long, env = "MINPOINTS_FETCHER", value_enum, default_value = "curl")]
    fetcher: FetcherArg,

    /// HTTP download timeout in seconds (http fetcher only).
    #[arg(long, env = "MINPOINTS_DOWNLOAD_TIMEOUT")]
    download_timeout: Option<u64>,

    /// Verify TLS certificates (curl is run without -k).
    #[arg(long, env = "MINPOINTS_STRICT_TLS")]
    strict_tls: bool,

    /// Pretty-print the JSON output.
    #[arg(long, env = "MINPOINTS_PRETTY")]
    pretty: bool,

    /// Skip download and conversion; parse this existing text dump.
    #[arg(long, value_name = "TXT")]
    from_text: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, env = "MINPOINTS_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FetcherArg {
    Curl,
    Http,
}

impl From<FetcherArg> for FetchBackend {
    fn from(v: FetcherArg) -> Self {
        match v {
            FetcherArg::Curl => FetchBackend::Curl,
            FetcherArg::Http => FetchBackend::Http,
        }
    }
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// JSON file written by a previous run.
    #[arg(long, default_value = "data/schools-2025.json")]
    input: PathBuf,

    /// Case-insensitive text search (school, profile, symbol, district).
    #[arg(short, long)]
    search: Option<String>,

    /// Only this district (exact name).
    #[arg(short, long)]
    district: Option<String>,

    /// Minimum points, inclusive.
    #[arg(long)]
    min: Option<f64>,

    /// Maximum points, inclusive.
    #[arg(long)]
    max: Option<f64>,

    /// Include profiles whose points are "n.d.".
    #[arg(long)]
    include_no_data: bool,

    /// Ordering: district-asc, school-asc, points-desc, points-asc.
    #[arg(long, default_value = "district-asc", value_parser = parse_sort)]
    sort: SortMode,

    /// Print at most this many rows.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print only this page of the results (1-based).
    #[arg(short, long)]
    page: Option<usize>,

    /// Rows per page when --page is given.
    #[arg(long, default_value_t = PAGE_SIZE)]
    page_size: usize,

    /// Print matching rows as a JSON array instead of a table.
    #[arg(long)]
    json: bool,
}

fn parse_sort(s: &str) -> Result<SortMode, String> {
    s.parse()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers stage-level feedback, so library INFO logs are
    // only shown when it is off.
    let show_progress = !cli.quiet && !cli.extract.no_progress && cli.command.is_none();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Command::Query(ref args)) => run_query(args, cli.quiet).await,
        None => run_extract(&cli.extract, show_progress, cli.quiet).await,
    }
}

async fn run_extract(args: &ExtractArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(args, progress)?;

    let output = match args.from_text {
        Some(ref txt) => extract_from_text(&config, txt)
            .await
            .with_context(|| format!("Failed to parse {}", txt.display()))?,
        None => extract(&config).await.context("Extraction failed")?,
    };

    if !quiet {
        print_extract_summary(&output, show_progress);
    }
    Ok(())
}

/// Map CLI args to `ExtractConfig`.
fn build_config(args: &ExtractArgs, progress: Option<ProgressCallback>) -> Result<ExtractConfig> {
    let mut builder = ExtractConfig::builder()
        .url(args.url.clone())
        .data_dir(&args.data_dir)
        .fetcher(args.fetcher.into())
        .accept_invalid_certs(!args.strict_tls)
        .pretty(args.pretty);

    if let Some(ref output) = args.output {
        builder = builder.output(output);
    }
    if let Some(secs) = args.download_timeout {
        builder = builder.download_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_extract_summary(output: &ExtractOutput, show_progress: bool) {
    let no_data = output.rows.iter().filter(|r| r.has_no_data()).count();
    if !show_progress {
        eprintln!(
            "Parsed {} rows ({} lines skipped)",
            output.stats.rows,
            output.stats.skipped()
        );
    }
    eprintln!(
        "{}  {} rows  {} without data  {}ms  →  {}",
        if output.rows.is_empty() {
            cyan("⚠")
        } else {
            green("✔")
        },
        output.rows.len(),
        no_data,
        output.timings.total_ms,
        bold(&output.output_path.display().to_string()),
    );
}

async fn run_query(args: &QueryArgs, quiet: bool) -> Result<()> {
    let rows = load_rows(&args.input)
        .await
        .with_context(|| format!("Failed to load rows from {}", args.input.display()))?;

    let filter = RowFilter {
        search: args.search.clone(),
        district: args.district.clone(),
        min_points: args.min,
        max_points: args.max,
        include_no_data: args.include_no_data,
    };
    let matching = filter.apply(&rows);
    let mut sorted = query::sort_rows(&matching, args.sort);
    let summary = query::summarize(&sorted);
    if let Some(limit) = args.limit {
        sorted.truncate(limit);
    }
    let page = args
        .page
        .map(|number| Page::of(sorted.len(), number, args.page_size));
    let shown = match page {
        Some(ref page) => page.slice(&sorted),
        None => &sorted[..],
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let json = serde_json::to_string_pretty(shown).context("Failed to serialise rows")?;
        writeln!(out, "{json}").context("Failed to write to stdout")?;
    } else {
        write_table(&mut out, shown).context("Failed to write to stdout")?;
    }

    if !quiet {
        if let Some(page) = page {
            eprintln!("Page {} of {}", page.number, page.total_pages);
        }
        eprintln!(
            "{} profiles  {} schools  {} districts",
            bold(&summary.rows.to_string()),
            bold(&summary.schools.to_string()),
            bold(&summary.districts.to_string()),
        );
    }
    Ok(())
}

/// Plain-text table; district and school are printed once per school.
fn write_table(out: &mut impl Write, rows: &[&Row]) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "No rows match the given filters.")?;
        return Ok(());
    }
    for group in query::group_consecutive(rows) {
        writeln!(out, "{}  {}", group.district, group.school)?;
        for row in group.rows {
            writeln!(
                out,
                "    {:<6} {:<50} {:>8}",
                row.symbol, row.profile, row.min_points_raw
            )?;
        }
    }
    Ok(())
}
