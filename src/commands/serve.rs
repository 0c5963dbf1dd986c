use crate::config::Config;
use crate::db::Database;
use crate::services::web;
use anyhow::Result;

/// Open the database and run the API server until shutdown
pub fn handle_serve(config: &Config) -> Result<()> {
    tracing::info!(db = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(web::start_server(config.socket_addr(), db))
}
