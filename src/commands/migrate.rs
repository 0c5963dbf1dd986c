use crate::MigrateCommands;
use crate::config::Config;
use crate::db;
use anyhow::Result;

const BANNER: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

fn print_header(title: &str) {
    println!("{}", BANNER);
    println!("{}", title);
    println!("{}", BANNER);
}

/// Handle migrate commands
pub fn handle_migrate(config: &Config, command: MigrateCommands) -> Result<()> {
    let conn = db::get_connection(&config.db_path)?;

    match command {
        MigrateCommands::Up => {
            print_header("Migrating database up (one migration)");
            if db::migrations::migrate_up(&conn)? {
                println!("✓ Migrated to version {}", db::migrations::get_current_migration_version(&conn)?);
            } else {
                println!("Already up to date");
            }
        }
        MigrateCommands::Down => {
            print_header("Rolling back database (one migration)");
            if db::migrations::migrate_down(&conn)? {
                println!("✓ Rolled back to version {}", db::migrations::get_current_migration_version(&conn)?);
            } else {
                println!("No migrations to roll back");
            }
        }
        MigrateCommands::Status => {
            print_header("Migration Status");
            println!();

            let status = db::migrations::get_migration_status(&conn)?;
            let current_version = db::migrations::get_current_migration_version(&conn)?;

            println!("Database: {}", config.db_path.display());
            println!("Current version: {}", current_version);
            println!();
            println!(
                "{:<8} {:<40} {:<12} {:<12}",
                "Version", "Name", "Status", "Rollback"
            );
            println!("{}", "-".repeat(80));

            for (version, name, is_applied, can_rollback) in status {
                let status_str = if is_applied {
                    "✓ Applied"
                } else {
                    "  Pending"
                };
                let rollback_str = if can_rollback { "Yes" } else { "No" };
                println!(
                    "{:<8} {:<40} {:<12} {:<12}",
                    version, name, status_str, rollback_str
                );
            }
        }
    }

    Ok(())
}
