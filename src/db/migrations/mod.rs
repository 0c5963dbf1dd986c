use anyhow::{Context, Result};
use rusqlite::{Connection, params};

#[path = "001_initial_schema.rs"]
mod m001_initial_schema;
#[path = "002_add_quotes_table.rs"]
mod m002_add_quotes_table;

type MigrationFn = fn(&Connection) -> Result<()>;

struct Migration {
    version: i64,
    name: &'static str,
    up: MigrationFn,
    down: Option<MigrationFn>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        up: m001_initial_schema::up,
        down: Some(m001_initial_schema::down),
    },
    Migration {
        version: 2,
        name: "add_quotes_table",
        up: m002_add_quotes_table::up,
        down: Some(m002_add_quotes_table::down),
    },
];

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        )",
        [],
    )
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

/// Highest applied migration version (0 when none)
pub fn get_current_migration_version(conn: &Connection) -> Result<i64> {
    ensure_migrations_table(conn)?;
    let version = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .context("Failed to read migration version")?;
    Ok(version)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    (migration.up)(&tx)
        .with_context(|| format!("Migration {:03} ({}) failed", migration.version, migration.name))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.name, chrono::Utc::now().timestamp()],
    )?;
    tx.commit()?;
    tracing::info!(version = migration.version, name = migration.name, "Applied migration");
    Ok(())
}

/// Apply every pending migration in order
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current = get_current_migration_version(conn)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration)?;
    }
    Ok(())
}

/// Apply the next pending migration. Returns false when already up to date.
pub fn migrate_up(conn: &Connection) -> Result<bool> {
    let current = get_current_migration_version(conn)?;
    match MIGRATIONS.iter().find(|m| m.version > current) {
        Some(migration) => {
            apply(conn, migration)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Roll back the latest applied migration. Returns false when nothing is applied.
pub fn migrate_down(conn: &Connection) -> Result<bool> {
    let current = get_current_migration_version(conn)?;
    let Some(migration) = MIGRATIONS.iter().find(|m| m.version == current) else {
        return Ok(false);
    };
    let down = migration.down.with_context(|| {
        format!(
            "Migration {:03} ({}) cannot be rolled back",
            migration.version, migration.name
        )
    })?;

    let tx = conn.unchecked_transaction()?;
    down(&tx).with_context(|| format!("Rollback of migration {:03} failed", migration.version))?;
    tx.execute(
        "DELETE FROM schema_migrations WHERE version = ?1",
        params![migration.version],
    )?;
    tx.commit()?;
    tracing::info!(version = migration.version, name = migration.name, "Rolled back migration");
    Ok(true)
}

/// `(version, name, applied, can_rollback)` for every known migration
pub fn get_migration_status(conn: &Connection) -> Result<Vec<(i64, &'static str, bool, bool)>> {
    ensure_migrations_table(conn)?;
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let applied = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(MIGRATIONS
        .iter()
        .map(|m| (m.version, m.name, applied.contains(&m.version), m.down.is_some()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n == 1)
        .unwrap_or(false)
    }

    #[test]
    fn runs_all_migrations_once() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_current_migration_version(&conn).unwrap(), 2);
        assert!(table_exists(&conn, "erhadata"));
        assert!(table_exists(&conn, "quotes"));
        assert!(!migrate_up(&conn).unwrap());
    }

    #[test]
    fn steps_down_and_up() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert!(migrate_down(&conn).unwrap());
        assert_eq!(get_current_migration_version(&conn).unwrap(), 1);
        assert!(!table_exists(&conn, "quotes"));

        let status = get_migration_status(&conn).unwrap();
        assert_eq!(
            status,
            vec![(1, "initial_schema", true, true), (2, "add_quotes_table", false, true)]
        );

        assert!(migrate_up(&conn).unwrap());
        assert!(table_exists(&conn, "quotes"));

        assert!(migrate_down(&conn).unwrap());
        assert!(migrate_down(&conn).unwrap());
        assert!(!migrate_down(&conn).unwrap());
        assert!(!table_exists(&conn, "erhadata"));
    }
}
