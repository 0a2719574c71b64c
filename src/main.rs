//! dexcards CLI - Localized creature cards from the public catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dexcards::client::FetchStats;
use dexcards::pipeline::SessionCommand;
use dexcards::{
    BatchReport, Config, HttpFetcher, JsonFetcher, JsonLines, Renderer, SearchRequest,
    SearchSession, TextCards,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "dexcards")]
#[command(version)]
#[command(about = "Batched, fault-tolerant lookups of localized creature cards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults apply when it is missing)
    #[arg(short, long, global = true, default_value = "dexcards.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit one JSON object per record instead of text cards
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up comma-separated identifiers (ids or names)
    Search {
        /// e.g. "1, 4, pikachu"
        ids: String,
    },

    /// Look up randomly drawn identifiers
    Random {
        /// Number of distinct identifiers to draw
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Read searches from stdin, one per line
    ///
    /// A plain line replaces the shown cards, `+line` appends, `?` or `?N`
    /// draws random identifiers, `!` clears and `q` quits.
    Interactive,

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn print_example_config() {
    let example = r#"# dexcards configuration file

[catalog]
# Primary endpoint; records are fetched from {base_url}/{id}
base_url = "https://pokeapi.co/api/v2/pokemon"
# Per-request timeout in seconds (0 waits forever)
timeout_secs = 30
# user_agent = "dexcards/0.1"

[localization]
language = "es"
# Tried in order when a name is missing in `language` (empty = strict)
fallback_languages = ["en"]

[batching]
# Move name lookups in flight at once
move_batch_size = 10
placeholder = "Nombre no encontrado"
# "uniform": any failed name becomes the placeholder
# "strict": a failed type or ability name tombstones the record
fault_policy = "uniform"

[random]
min_id = 1
max_id = 1302
count = 4
"#;
    println!("{example}");
}


fn make_renderer(json: bool) -> Box<dyn Renderer> {
    if json {
        Box::new(JsonLines::new(std::io::stdout()))
    } else {
        Box::new(TextCards::new(std::io::stdout()).with_progress())
    }
}

fn print_summary(report: &BatchReport, stats: FetchStats) {
    eprintln!("\n=== Search Complete ===");
    eprintln!("Records:     {}", report.total());
    eprintln!("Resolved:    {}", report.resolved);
    eprintln!("Not found:   {}", report.tombstoned);
    eprintln!("Requests:    {}", stats.requests);
    eprintln!("Failures:    {}", stats.failures);
    eprintln!(
        "Runtime:     {:.1}s",
        (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
    );
}

async fn run_once(
    session: &SearchSession,
    fetcher: &HttpFetcher,
    request: SearchRequest,
    json: bool,
) -> Result<()> {
    let mut renderer = make_renderer(json);
    match session.search(&request, renderer.as_mut()).await? {
        Some(report) if !json => print_summary(&report, fetcher.stats()),
        Some(_) => {}
        None => warn!("No identifiers given"),
    }
    Ok(())
}

async fn run_interactive(session: &SearchSession, json: bool) -> Result<()> {
    let mut renderer = make_renderer(json);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!("Reading searches from stdin ('q' to quit)");
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let Some(command) = SessionCommand::parse(&line) else {
            continue;
        };

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Reset => session.reset(renderer.as_mut())?,
            SessionCommand::Search(request) => {
                // A bad random count only loses this line
                if let Err(e) = session.search(&request, renderer.as_mut()).await {
                    warn!(error = %e, "Search rejected");
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match &cli.command {
        Commands::Example => {
            print_example_config();
            return Ok(());
        }

        Commands::Validate => {
            let config = Config::from_file(&cli.config)
                .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

            info!("Configuration is valid");
            info!("  Catalog: {}", config.catalog.resolved_base_url());
            info!(
                "  Languages: {}",
                config.localization.chain().join(" → ")
            );
            info!(
                "  Move batch size: {} ({:?} faults)",
                config.batching.move_batch_size, config.batching.fault_policy
            );
            info!(
                "  Random: {} from {}..={}",
                config.random.count, config.random.min_id, config.random.max_id
            );
            return Ok(());
        }

        _ => {}
    }

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    let fetcher = Arc::new(
        HttpFetcher::from_config(&config.catalog).context("Failed to create HTTP client")?,
    );
    let session = SearchSession::from_config(fetcher.clone() as Arc<dyn JsonFetcher>, &config)
        .context("Failed to set up search")?;

    match cli.command {
        Commands::Search { ids } => {
            run_once(&session, &fetcher, SearchRequest::explicit(ids), cli.json).await?
        }
        Commands::Random { count } => {
            run_once(&session, &fetcher, SearchRequest::random(count), cli.json).await?
        }
        Commands::Interactive => run_interactive(&session, cli.json).await?,
        Commands::Validate | Commands::Example => {}
    }

    Ok(())
}
