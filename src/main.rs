use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use vinyl_sorter::app::browse_use_case::{all_genres, year_bounds, CollectionQuery, SortKey};
use vinyl_sorter::app::curate_use_case::{self, ItemSelector};
use vinyl_sorter::app::enrich_use_case::EnrichUseCase;
use vinyl_sorter::app::ports::CancellationFlag;
use vinyl_sorter::config::Config;
use vinyl_sorter::constants::{self, DISCOGS_TOKEN_ENV};
use vinyl_sorter::domain::sort_collection;
use vinyl_sorter::infra::csv_table::{read_collection, write_collection_file};
use vinyl_sorter::infra::event_channel::spawn_console_renderer;
use vinyl_sorter::infra::{ChannelSink, DiscogsCatalog};
use vinyl_sorter::observability::{self, metrics};

#[derive(Parser)]
#[command(name = "vinyl-sorter")]
#[command(about = "Enrich and sort a Discogs collection export")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to ./vinyl-sorter.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory for the rotating process log
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch catalog metadata for every record and write a sorted export
    Enrich {
        /// Discogs collection export (CSV)
        #[arg(long)]
        input: PathBuf,
        /// Output of an earlier run; records found there are not fetched again
        #[arg(long)]
        previous: Option<PathBuf>,
        /// Discogs personal access token
        #[arg(long, env = DISCOGS_TOKEN_ENV, hide_env_values = true)]
        token: Option<String>,
        /// Exact output path; overrides --output-dir naming
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Re-sort an enriched export without contacting the catalog
    Sort {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// List records from an enriched export, filtered and ordered
    Browse {
        #[arg(long)]
        input: PathBuf,
        /// Text matched against artist, title, year and genres
        #[arg(long)]
        search: Option<String>,
        /// Keep records with any of these genres (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
        /// artist, genre or year
        #[arg(long, default_value = "artist")]
        sort: SortKey,
    },
    /// Choose a record's primary genre from its own genres, regroup by genre and export
    SetGenre {
        #[arg(long)]
        input: PathBuf,
        /// Record id as listed by `browse` on the same file
        #[arg(long, conflicts_with = "release_id", required_unless_present = "release_id")]
        id: Option<Uuid>,
        /// Apply to every copy of this release
        #[arg(long)]
        release_id: Option<String>,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads DISCOGS_TOKEN
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = observability::init_logging(&cli.log_dir);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = config.metrics.port {
        if let Err(e) = metrics::init(port) {
            warn!("Metrics disabled: {}", e);
        }
    }

    match cli.command {
        Commands::Enrich {
            input,
            previous,
            token,
            output,
            output_dir,
        } => {
            let token = token
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| anyhow!("A Discogs token is required: pass --token or set {}", DISCOGS_TOKEN_ENV))?;

            println!("📊 Parsing {}...", input.display());
            let items = read_collection(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let previous = match previous {
                Some(path) => {
                    println!("📊 Parsing previous data from {}...", path.display());
                    read_collection(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?
                }
                None => Vec::new(),
            };

            let catalog = DiscogsCatalog::new(&config.discogs)?;
            let use_case = EnrichUseCase::new(Box::new(catalog), config.enrich_settings());

            let cancel = CancellationFlag::new();
            {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("Stop requested; finishing the current record");
                        cancel.cancel();
                    }
                });
            }

            let (sink, rx) = ChannelSink::new();
            let renderer = spawn_console_renderer(rx);

            let input_count = items.len();
            let outcome = use_case
                .enrich(items, &previous, &token, &sink, &sink, &cancel)
                .await;
            drop(sink);
            renderer.await?;

            let path = output.unwrap_or_else(|| {
                let today = chrono::Local::now().date_naive();
                output_dir.join(constants::output_file_name(outcome.was_cancelled, today))
            });
            write_collection_file(&path, &outcome.items)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            if outcome.was_cancelled {
                println!("⏹️ Processing stopped. Saved current progress.");
            }
            println!("\n📊 Enrichment results:");
            println!("   Input rows: {}", input_count);
            println!("   Written: {}", outcome.items.len());
            println!("   Dropped or not reached: {}", input_count - outcome.items.len());
            println!("   Output file: {}", path.display());
            info!(
                output = %path.display(),
                written = outcome.items.len(),
                cancelled = outcome.was_cancelled,
                "Enrich command finished"
            );
        }
        Commands::Sort { input, output } => {
            let mut items = read_collection(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            sort_collection(&mut items);
            write_collection_file(&output, &items)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✅ Sorted {} records into {}", items.len(), output.display());
        }
        Commands::Browse {
            input,
            search,
            genres,
            from,
            to,
            sort,
        } => {
            let items = read_collection(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let bounds = year_bounds(&items);
            let year_range = match (from, to, bounds) {
                (None, None, _) => None,
                (from, to, Some((lo, hi))) => Some((from.unwrap_or(lo), to.unwrap_or(hi))),
                (from, to, None) => Some((from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX))),
            };
            let query = CollectionQuery {
                search,
                genres,
                year_range,
                sort_by: sort,
            };

            let selected = query.apply(&items);
            for item in &selected {
                let year = item
                    .release_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "----".to_string());
                println!(
                    "{} | {} - {} [{}] ({})",
                    year,
                    item.artist,
                    item.title,
                    item.genres.join(", "),
                    item.id
                );
            }
            println!("\n{} of {} records", selected.len(), items.len());
            if let Some((lo, hi)) = bounds {
                println!("Years: {}–{}", lo, hi);
            }
            let genres = all_genres(&items);
            if !genres.is_empty() {
                println!("Genres: {}", genres.join(", "));
            }
            if selected.is_empty() {
                info!("No records matched the query");
            }
        }
        Commands::SetGenre {
            input,
            id,
            release_id,
            genre,
            output,
        } => {
            let selector = match (id, release_id) {
                (Some(id), _) => ItemSelector::Id(id),
                (None, Some(release_id)) => ItemSelector::ReleaseId(release_id),
                (None, None) => return Err(anyhow!("Pass --id or --release-id")),
            };
            let mut items = read_collection(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let updated = curate_use_case::set_primary_genre(&mut items, &selector, &genre)?;
            write_collection_file(&output, &items)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "🏷️ Set primary genre of {} record(s) ({}) to {}",
                updated,
                selector,
                genre.trim()
            );
            println!("✅ Wrote {} records grouped by genre to {}", items.len(), output.display());
        }
    }

    Ok(())
}
