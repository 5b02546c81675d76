use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricetable::api::{self, AuthConfig, ItemStore};
use pricetable::client::ItemsClient;
use pricetable::config::Config;
use pricetable::session::{PriceEdit, Session};
use pricetable::sync::TableController;
use pricetable::view::{self, Column, SortBy};

#[derive(Parser)]
#[command(name = "ptab")]
#[command(about = "Edit item prices and sync them with an items API")]
struct Cli {
    /// Base URL of the items API (overrides PRICETABLE_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bearer token for the items API (overrides PRICETABLE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the item table
    List {
        /// Column to sort by
        #[arg(short, long)]
        sort: Option<Column>,

        /// Sort descending
        #[arg(short, long)]
        desc: bool,
    },
    /// Change prices and save them in one batch
    SetPrice {
        /// Edits as ID=PRICE
        #[arg(required = true)]
        edits: Vec<PriceEdit>,

        /// Print the edited table without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Interactive editing session on stdin
    Edit,
    /// Run the local development items API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// JSON file with the initial items
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Require this bearer token on /api routes
        #[arg(long)]
        require_key: Option<String>,
    },
}

/// Logs go to stderr so table output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pricetable=info,tower_http=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let mut config = Config::load();
    if let Some(url) = &cli.url {
        config.api_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    config
}

fn build_controller(config: &Config) -> anyhow::Result<TableController> {
    let client = ItemsClient::from_config(config).context("Failed to build HTTP client")?;
    tracing::debug!("Using items API at {}", client.base_url());
    Ok(TableController::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli);

    match cli.command {
        Some(Commands::List { sort, desc }) => {
            let sort = match sort {
                Some(column) => SortBy {
                    column,
                    descending: desc,
                },
                None if desc => SortBy::descending(config.default_sort.column),
                None => config.default_sort,
            };
            let controller = build_controller(&config)?;
            controller.load().await?;
            print!("{}", view::render_view(&controller.snapshot(), sort));
        }
        Some(Commands::SetPrice { edits, dry_run }) => {
            let controller = build_controller(&config)?;
            controller.load().await?;

            for edit in &edits {
                if !controller.items().iter().any(|item| item.id == edit.id) {
                    tracing::warn!("No item with id {}; skipping {}", edit.id, edit);
                }
                controller.set_price(&edit.id, edit.price.clone());
            }

            if dry_run {
                tracing::info!("Dry run: {} edit(s) not saved", edits.len());
            } else {
                controller.save().await?;
            }

            print!("{}", view::render_view(&controller.snapshot(), config.default_sort));
            for notice in controller.take_notices() {
                if !notice.is_expired() {
                    println!("{}", notice.message);
                }
            }
        }
        Some(Commands::Edit) => {
            let controller = build_controller(&config)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut session = Session::new(controller, config.default_sort, std::io::stdout());
            session.run(stdin).await?;
        }
        Some(Commands::Serve {
            port,
            seed,
            require_key,
        }) => {
            let store = match seed {
                Some(path) => ItemStore::from_seed_file(&path)?,
                None => ItemStore::default(),
            };
            let auth = match require_key {
                Some(key) => AuthConfig::with_api_key(key),
                None => AuthConfig::disabled(),
            };

            let app = api::create_router_with_auth(store, auth);

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Items API listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        None => {
            let controller = build_controller(&config)?;
            controller.load().await?;
            print!(
                "{}",
                view::render_view(&controller.snapshot(), config.default_sort)
            );
        }
    }

    Ok(())
}
