// Library crate for erha-ops - exposes modules for the binary and integration tests
pub mod commands;
pub mod config;
pub mod db;
pub mod patch;
pub mod services;

// CLI-specific types (used by both library and binary)
use clap::Subcommand;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the jobs and quotes API server
    Serve {
        /// Address to bind (overrides ERHA_HOST)
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to listen on (overrides ERHA_PORT)
        #[arg(long, short)]
        port: Option<u16>,
        /// SQLite database file (overrides ERHA_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Database migrations
    Migrate {
        /// SQLite database file (overrides ERHA_DB_PATH)
        #[arg(long, global = true)]
        db: Option<PathBuf>,
        #[command(subcommand)]
        command: MigrateCommands,
    },
}

#[derive(Subcommand, Clone, Copy, Debug)]
pub enum MigrateCommands {
    /// Apply the next pending migration
    Up,
    /// Roll back the latest migration
    Down,
    /// List migrations and whether they are applied
    Status,
}
