use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use serde_json::Value;
use tldw_core::{
    FetchConfig, MetadataFetcher, Pipeline, PipelineConfig, StructuredSummary, Upsert, Validator, VideoRecord,
    VideoStore, YtDlpFetcher, attach_viz, discover_summaries, discover_transcripts, extract_summary_with_validator,
    now_millis, read_input,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{
    print_banner, print_batch_report, print_error, print_info, print_step, print_success, print_summary_shape,
    print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract structured summaries from video summary documents and keep a
/// collection of analyzed videos
#[derive(Parser, Debug)]
#[command(name = "tldw")]
#[command(version)]
#[command(about = "Structured summaries and visualization data for long videos", long_about = None)]
struct Cli {
    /// Collection file (default: <data dir>/tldw/videos.json)
    #[arg(long, global = true, value_name = "FILE")]
    data_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a structured summary from a document and print it as JSON
    Extract(ExtractArgs),
    /// Validate a summary and add or update a video record
    Record(RecordArgs),
    /// Import summary documents for videos already in the collection
    Import(ImportArgs),
    /// Add visualization data to stored summaries that lack it
    Viz,
    /// Register cached transcripts that are not in the collection yet
    History(HistoryArgs),
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Summary document, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Source id stored as `videoId`
    #[arg(long)]
    id: String,

    /// Also derive mindmap, stats and suggested visualizations
    #[arg(long)]
    viz: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RecordArgs {
    video_id: String,
    title: String,
    channel: String,
    /// Duration in seconds
    duration: u64,
    #[arg(default_value_t = 0)]
    view_count: u64,
    #[arg(default_value_t = 0)]
    like_count: u64,
    #[arg(default_value_t = 0)]
    insights_count: u64,

    /// Summary JSON file, or "-" for stdin
    #[arg(short, long, value_name = "FILE")]
    summary: Option<String>,

    /// Thumbnail URL
    #[arg(short, long, value_name = "URL")]
    thumbnail: Option<String>,

    /// Original source URL (for non-YouTube videos)
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Directory of `<id>_*.md` files or `<id>/summary.txt` folders
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Re-extract records that already have ideas or insights
    #[arg(long)]
    force: bool,

    /// Skip visualization synthesis
    #[arg(long)]
    no_viz: bool,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Transcript cache directory (`<id>/transcript.txt`)
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Netscape cookies file passed to yt-dlp
    #[arg(long, value_name = "FILE")]
    cookies: Option<PathBuf>,

    /// Per-video metadata timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Pause between metadata lookups in milliseconds
    #[arg(long, default_value = "1000", value_name = "MS")]
    delay_ms: u64,

    /// yt-dlp executable
    #[arg(long, default_value = "yt-dlp", value_name = "PATH")]
    yt_dlp: String,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn open_store(data_file: Option<PathBuf>) -> anyhow::Result<VideoStore> {
    match data_file {
        Some(path) => Ok(VideoStore::new(path)),
        None => VideoStore::default_location().context("Failed to resolve the default data file"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Extract(args) => extract(args, cli.verbose),
        Command::Record(args) => record(args, &open_store(cli.data_file)?),
        Command::Import(args) => import(&args, &open_store(cli.data_file)?),
        Command::Viz => viz(&open_store(cli.data_file)?),
        Command::History(args) => history(args, &open_store(cli.data_file)?).await,
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tldw", &mut io::stdout());
            Ok(())
        }
    }
}

fn extract(args: ExtractArgs, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        print_step(1, 3, &format!("Reading {}", args.input.bright_white()));
    }
    let text = read_input(&args.input).with_context(|| format!("Failed to read input: {}", args.input))?;

    if verbose {
        print_step(2, 3, "Extracting sections");
    }
    let validation =
        extract_summary_with_validator(&text, &args.id, &Validator::new()).context("Failed to extract summary")?;
    let mut summary = validation.summary;
    if verbose {
        print_summary_shape(&summary);
    }

    if args.viz && !attach_viz(&mut summary) {
        print_info("No visualization data for this summary");
    }

    if verbose {
        print_step(3, 3, "Writing output");
    }
    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    match args.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn record(args: RecordArgs, store: &VideoStore) -> anyhow::Result<()> {
    let summary = match &args.summary {
        Some(input) => load_summary(input, &args.video_id)?,
        None => None,
    };

    let mut record = VideoRecord {
        id: args.video_id,
        title: args.title,
        channel: args.channel,
        duration: args.duration,
        view_count: args.view_count,
        like_count: args.like_count,
        insights_count: args.insights_count,
        analyzed_at: now_millis(),
        thumbnail: args.thumbnail,
        source_url: args.source_url,
        ..Default::default()
    };
    if let Some(summary) = &summary {
        record.set_summary(summary)?;
    }

    let mut collection = store.load().context("Failed to load collection")?;
    debug!(path = %store.path().display(), videos = collection.videos.len(), "collection loaded");
    let id = record.id.clone();
    match collection.upsert(record) {
        Upsert::Inserted => print_success(&format!("Added new record for {}", id.bright_white())),
        Upsert::Updated => print_success(&format!("Updated existing record for {}", id.bright_white())),
    }

    store.save(&mut collection).context("Failed to save collection")?;
    print_info(&format!("Data saved to {}", store.path().display()));
    Ok(())
}

/// Reads and validates a summary; an empty document means "no summary".
fn load_summary(input: &str, video_id: &str) -> anyhow::Result<Option<StructuredSummary>> {
    let text = read_input(input).with_context(|| format!("Failed to read summary: {}", input))?;
    let raw: Value = serde_json::from_str(&text).context("Invalid JSON in summary file")?;
    if is_blank(&raw) {
        return Ok(None);
    }

    let validation = Validator::new().validate(raw, video_id).context("Summary validation failed")?;
    if validation.was_repaired() {
        print_warning(&format!("Summary repaired: {}", validation.repairs.join(", ")));
    }
    print_summary_shape(&validation.summary);
    Ok(Some(validation.summary))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn import(args: &ImportArgs, store: &VideoStore) -> anyhow::Result<()> {
    let docs = discover_summaries(&args.dir)
        .with_context(|| format!("Failed to read summary directory: {}", args.dir.display()))?;
    if docs.is_empty() {
        print_info("No summary documents found");
        return Ok(());
    }
    print_info(&format!("Found {} summary documents", docs.len()));

    let mut collection = store.load().context("Failed to load collection")?;
    debug!(dir = %args.dir.display(), documents = docs.len(), force = args.force, "importing summaries");
    let config = PipelineConfig::builder()
        .synthesize_viz(!args.no_viz)
        .skip_summarized(!args.force)
        .build();
    let report = Pipeline::with_config(config).run(&docs, &mut collection)?;
    print_batch_report(&report);

    if !report.updated.is_empty() {
        store.save(&mut collection).context("Failed to save collection")?;
        print_info(&format!("Data saved to {}", store.path().display()));
    }
    Ok(())
}

fn viz(store: &VideoStore) -> anyhow::Result<()> {
    let mut collection = store.load().context("Failed to load collection")?;
    debug!(videos = collection.videos.len(), "backfilling visualization data");
    let updated = Pipeline::new().backfill_viz(&mut collection);
    if updated.is_empty() {
        print_info("No summaries needed visualization data");
        return Ok(());
    }

    for id in &updated {
        print_success(&format!("Visualization added for {}", id.bright_white()));
    }
    store.save(&mut collection).context("Failed to save collection")?;
    print_info(&format!("Data saved to {}", store.path().display()));
    Ok(())
}

async fn history(args: HistoryArgs, store: &VideoStore) -> anyhow::Result<()> {
    let entries = discover_transcripts(&args.dir)
        .with_context(|| format!("Failed to read transcript directory: {}", args.dir.display()))?;
    let mut collection = store.load().context("Failed to load collection")?;
    let pending: Vec<_> = entries.into_iter().filter(|e| !collection.contains(&e.video_id)).collect();
    debug!(pending = pending.len(), "transcripts without a record");
    if pending.is_empty() {
        print_info("No new transcripts to register");
        return Ok(());
    }

    let fetcher = YtDlpFetcher::new(FetchConfig {
        binary: args.yt_dlp,
        cookies: args.cookies,
        timeout: args.timeout,
        delay_ms: args.delay_ms,
    });

    let mut added = 0;
    for (i, entry) in pending.iter().enumerate() {
        if i > 0 && fetcher.config().delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(fetcher.config().delay_ms)).await;
        }
        print_step(i + 1, pending.len(), &format!("Fetching {}", entry.video_id.bright_white()));

        match fetcher.fetch(&entry.video_id).await {
            Some(metadata) => {
                let title = metadata.title.clone();
                collection.upsert(metadata.into_record(&entry.video_id, entry.modified_at));
                print_success(&title);
                added += 1;
            }
            None => print_error(&format!("Metadata unavailable for {}, skipped", entry.video_id)),
        }
    }

    if added > 0 {
        store.save(&mut collection).context("Failed to save collection")?;
    }
    print_info(&format!("Registered {} of {} new transcripts", added, pending.len()));
    Ok(())
}
