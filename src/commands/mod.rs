// Command module routing
//
// To add a new command:
// 1. Create a new file in this directory (e.g., `mycommand.rs`)
// 2. Add `pub mod mycommand;` below
// 3. Add the match arm in `handle_command` function

pub mod migrate;
pub mod serve;

use crate::Commands;
use crate::config::Config;
use anyhow::Result;

/// Dispatch command to appropriate handler
pub fn handle_command(command: Commands) -> Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { host, port, db } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            serve::handle_serve(&config)?;
        }
        Commands::Migrate { db, command } => {
            if let Some(db) = db {
                config.db_path = db;
            }
            migrate::handle_migrate(&config, command)?;
        }
    }
    Ok(())
}
