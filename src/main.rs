mod config;
mod error;
mod logging;
mod query;
mod server;
mod source;
mod store;
mod sync;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dexcache")]
#[command(about = "A read-through caching proxy for a paginated REST catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/dexcache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Address to listen on
  #[arg(short, long)]
  bind: Option<SocketAddr>,

  /// SQLite database file
  #[arg(short, long)]
  database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line overrides
  if let Some(bind) = args.bind {
    config.server.bind = bind;
  }
  if let Some(database) = args.database {
    config.database.path = Some(database);
  }

  let _log_guard = logging::init(&config.logging)?;

  let db_path = config.database_path()?;
  let store = store::SqliteStore::open(&db_path)
    .map_err(|e| eyre!("Failed to open database at {}: {}", db_path.display(), e))?;
  info!(path = %db_path.display(), "opened record store");

  let gateway = source::SourceClient::new(&config.source)
    .map_err(|e| eyre!("Failed to create source client: {}", e))?;
  info!(source = %config.source.base_url, "source gateway ready");

  let service = Arc::new(query::QueryService::new(Arc::new(store), Arc::new(gateway)));
  server::serve(config.server.bind, server::router(service)).await
}
