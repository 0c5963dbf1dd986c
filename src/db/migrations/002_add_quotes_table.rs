use anyhow::{Context, Result};
use rusqlite::Connection;

/// Migration 002: Add quotes table
pub fn up(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS quotes (
            id TEXT PRIMARY KEY,
            quote_number TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            priority TEXT NOT NULL DEFAULT 'medium',
            subtotal REAL NOT NULL DEFAULT 0,
            tax_amount REAL NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'ZAR',
            valid_until TEXT,
            delivery_days INTEGER,
            metadata TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .context("Failed to create quotes table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_quotes_status_created ON quotes (status, created_at)",
        [],
    )
    .context("Failed to create quotes status index")?;

    Ok(())
}

/// Rollback: Remove quotes table
pub fn down(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS quotes", [])
        .context("Failed to drop quotes table")?;
    Ok(())
}
