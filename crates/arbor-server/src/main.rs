//! Arbor Server — opens the node store and wires the directory service.

use arbor_db::{DbConfig, DbManager};
use arbor_directory::{DirectoryConfig, DirectoryService};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Arbor hierarchical directory server
#[derive(Parser, Debug)]
#[command(name = "arbor-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// SurrealDB WebSocket address
    #[arg(long, env = "ARBOR_DB_URL", default_value = "127.0.0.1:8000")]
    db_url: String,

    #[arg(long, env = "ARBOR_DB_NAMESPACE", default_value = "arbor")]
    db_namespace: String,

    #[arg(long, env = "ARBOR_DB_DATABASE", default_value = "directory")]
    db_database: String,

    #[arg(long, env = "ARBOR_DB_USERNAME", default_value = "root")]
    db_username: String,

    #[arg(long, env = "ARBOR_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    db_password: String,

    #[arg(long, env = "ARBOR_DEFAULT_PAGE_SIZE", default_value_t = 50)]
    default_page_size: u64,
}

impl Args {
    fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }

    fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig {
            default_page_size: self.default_page_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), arbor_db::DbError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("arbor_server=info,arbor_db=info,arbor_directory=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    let args = Args::parse();
    tracing::info!("Starting Arbor server...");

    let store = DbManager::open(&args.db_config()).await?;
    let _directory = DirectoryService::new(store.nodes(), store.members(), args.directory_config());
    tracing::info!(config = ?args.directory_config(), "Directory service ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Arbor server stopped.");
    Ok(())
}
