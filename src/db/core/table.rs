use super::client::DbClient;
use super::errors::DbError;
use crate::patch::{AssembledStatement, Placeholder, SqlValue};
use rusqlite::Row;
use std::marker::PhantomData;

/// Trait for database table operations
/// Implement with `impl_table!` to map a row struct onto its table.
pub trait Table: Sized {
    /// Table name in the database
    fn table_name() -> &'static str;

    /// Primary key column name
    fn primary_key() -> &'static str;

    /// ORDER BY clause used for listings
    fn default_order() -> &'static str {
        Self::primary_key()
    }

    /// Convert from database row
    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    /// Get all column names
    fn all_columns() -> &'static [&'static str];
}

/// Type-safe database operations
pub struct DbTable<T: Table> {
    _phantom: PhantomData<T>,
}

impl<T: Table> DbTable<T> {
    /// Select a single record by primary key
    pub fn select(client: &DbClient, key: &str) -> Result<Option<T>, DbError> {
        let stmt = AssembledStatement::checked(
            format!(
                "SELECT {} FROM {} WHERE {} = ?1",
                T::all_columns().join(", "),
                T::table_name(),
                T::primary_key()
            ),
            vec![SqlValue::from(key)],
            Placeholder::Numbered,
        )?;
        client.query_one(&stmt, |row| T::from_row(row))
    }

    /// Select all records in the table's default order
    pub fn select_all(client: &DbClient) -> Result<Vec<T>, DbError> {
        let stmt = AssembledStatement::checked(
            format!(
                "SELECT {} FROM {} ORDER BY {}",
                T::all_columns().join(", "),
                T::table_name(),
                T::default_order()
            ),
            Vec::new(),
            Placeholder::Numbered,
        )?;
        client.query_many(&stmt, |row| T::from_row(row))
    }

    /// Select the records matching an assembled SELECT statement
    pub fn select_many(client: &DbClient, stmt: &AssembledStatement) -> Result<Vec<T>, DbError> {
        client.query_many(stmt, |row| T::from_row(row))
    }

    /// Run an assembled INSERT/UPDATE against this table, returning affected rows
    pub fn execute(client: &DbClient, stmt: &AssembledStatement) -> Result<usize, DbError> {
        client.execute(stmt)
    }

    /// Delete a record by primary key, returning affected rows
    pub fn delete(client: &DbClient, key: &str) -> Result<usize, DbError> {
        let stmt = AssembledStatement::checked(
            format!(
                "DELETE FROM {} WHERE {} = ?1",
                T::table_name(),
                T::primary_key()
            ),
            vec![SqlValue::from(key)],
            Placeholder::Numbered,
        )?;
        client.execute(&stmt)
    }
}
