use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::info;

use cinefetch::catalog::TmdbCatalogClient;
use cinefetch::config::Config;
use cinefetch::database::FavoritesStore;
use cinefetch::images::HttpImageFetcher;
use cinefetch::manager::SessionManager;
use cinefetch::models::{FavoriteRecord, SessionEvent};
use cinefetch::traits::CatalogClient;
use cinefetch::utils::HttpClient;

#[derive(Parser)]
#[command(name = "cinefetch")]
#[command(about = "Movie catalog browser with concurrent poster enrichment and persistent favorites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the favorites database
    Init,
    /// Load and display one catalog page with enriched posters
    Browse {
        /// Catalog page number (1-based)
        #[arg(default_value = "1")]
        page: u32,
    },
    /// List stored favorites with their notes
    Favorites,
    /// Add an item from a catalog page to favorites
    Favorite {
        /// Catalog page the item appears on
        page: u32,
        /// Catalog item id
        id: String,
        /// Personal note to attach
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Remove an item from favorites
    Unfavorite {
        /// Catalog item id
        id: String,
    },
    /// Show the description of an item, and the stored note if favorited
    Show {
        /// Catalog page the item appears on
        page: u32,
        /// Catalog item id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = if std::path::Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Init => {
            info!("Initializing favorites store...");
            FavoritesStore::open(&config.database.url, config.database.max_connections).await?;
            println!("Favorites store ready at {}", config.database.url);
        }
        Commands::Browse { page } => {
            run_browse(&config, page).await?;
        }
        Commands::Favorites => {
            let store =
                FavoritesStore::open(&config.database.url, config.database.max_connections).await?;
            let favorites = store.list().await?;
            if favorites.is_empty() {
                println!("No favorites yet.");
            } else {
                println!("{:<12} {:<40} Note", "Id", "Title");
                for record in favorites {
                    println!("{:<12} {:<40} {}", record.id, record.title, record.user_note);
                }
            }
        }
        Commands::Favorite { page, id, note } => {
            let item = lookup_item(&config, page, &id).await?;
            let store =
                FavoritesStore::open(&config.database.url, config.database.max_connections).await?;
            let record = FavoriteRecord::from_item(&item, note);
            store.upsert(&record).await?;
            println!("⭐ Added \"{}\" to favorites.", record.title);
        }
        Commands::Unfavorite { id } => {
            let store =
                FavoritesStore::open(&config.database.url, config.database.max_connections).await?;
            store.remove(&id).await?;
            println!("Removed {} from favorites.", id);
        }
        Commands::Show { page, id } => {
            let item = lookup_item(&config, page, &id).await?;
            let store =
                FavoritesStore::open(&config.database.url, config.database.max_connections).await?;
            println!("{}", item.title);
            if item.description.is_empty() {
                println!("(no description)");
            } else {
                println!("{}", item.description);
            }
            if let Some(favorite) = store.get(&id).await? {
                println!("Note: {}", favorite.user_note);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("cinefetch={}", level))
        .with_target(false)
        .init();

    Ok(())
}

fn build_catalog(config: &Config) -> Result<(Arc<TmdbCatalogClient>, Arc<HttpImageFetcher>)> {
    let http_client = HttpClient::new(&config.http);
    let catalog = Arc::new(TmdbCatalogClient::new(http_client.clone(), &config.api)?);
    let images = Arc::new(HttpImageFetcher::new(http_client));
    Ok((catalog, images))
}

async fn lookup_item(
    config: &Config,
    page: u32,
    id: &str,
) -> Result<cinefetch::models::CatalogItem> {
    let (catalog, _) = build_catalog(config)?;
    let items = catalog.fetch_page(page).await?;
    items
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| anyhow::anyhow!("item {} not found on page {}", id, page))
}

async fn run_browse(config: &Config, page: u32) -> Result<()> {
    let (catalog, images) = build_catalog(config)?;
    let manager = SessionManager::new(catalog, images);

    let mut events = manager.subscribe();
    let session_id = manager.start_session(page);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.green} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(format!("loading page {}", page));

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Progress { id, percent, .. } if id == session_id => {
                bar.set_position(percent as u64);
            }
            SessionEvent::Completed(snapshot) if snapshot.id == session_id => {
                bar.finish_and_clear();
                println!("🎬 Page {} ({} items)", snapshot.page, snapshot.items.len());
                for enriched in &snapshot.items {
                    let poster = match &enriched.poster {
                        Some(bytes) => format!("poster {} KiB", bytes.len() / 1024),
                        None => "no poster".to_string(),
                    };
                    println!("{:<12} {:<40} [{}]", enriched.item.id, enriched.item.title, poster);
                }
                return Ok(());
            }
            SessionEvent::Failed { snapshot, error } if snapshot.id == session_id => {
                bar.abandon_with_message("failed");
                anyhow::bail!("could not load page {}: {}", snapshot.page, error);
            }
            _ => {}
        }
    }

    anyhow::bail!("session event stream closed before page {} resolved", page)
}
