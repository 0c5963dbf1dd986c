use anyhow::{Context, Result};
use rusqlite::Connection;

/// Migration 001: Jobs table (`erhadata`)
pub fn up(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS erhadata (
            jobNo TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            estimatedValue REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING'
        )",
        [],
    )
    .context("Failed to create erhadata table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_erhadata_status ON erhadata (status)",
        [],
    )
    .context("Failed to create erhadata status index")?;

    Ok(())
}

/// Rollback: Remove jobs table
pub fn down(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS erhadata", [])
        .context("Failed to drop erhadata table")?;
    Ok(())
}
