use super::errors::DbError;
use crate::patch::AssembledStatement;
use rusqlite::{Connection, Row};

/// Database client executing assembled statements
pub struct DbClient {
    conn: Connection,
}

impl DbClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Execute a statement, binding its arguments positionally.
    /// Returns the number of affected rows.
    pub fn execute(&self, stmt: &AssembledStatement) -> Result<usize, DbError> {
        Ok(self
            .conn
            .execute(stmt.text(), rusqlite::params_from_iter(stmt.args().iter()))?)
    }

    /// Query a single row with custom mapping
    pub fn query_one<T, F>(&self, stmt: &AssembledStatement, mut f: F) -> Result<Option<T>, DbError>
    where
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        let mut prepared = self.conn.prepare(stmt.text())?;
        let mut rows = prepared.query_map(rusqlite::params_from_iter(stmt.args().iter()), |row| {
            f(row)
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Query multiple rows with custom mapping
    pub fn query_many<T, F>(&self, stmt: &AssembledStatement, f: F) -> Result<Vec<T>, DbError>
    where
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        let mut prepared = self.conn.prepare(stmt.text())?;
        let rows = prepared.query_map(rusqlite::params_from_iter(stmt.args().iter()), f)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Close the connection, reporting any error SQLite raises while finalizing
    pub fn close(self) -> Result<(), DbError> {
        self.conn.close().map_err(|(_, e)| DbError::from(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Placeholder, SqlValue};

    fn client() -> DbClient {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT PRIMARY KEY, n REAL, s TEXT)")
            .unwrap();
        DbClient::new(conn)
    }

    fn stmt(text: &str, args: Vec<SqlValue>) -> AssembledStatement {
        AssembledStatement::checked(text.to_string(), args, Placeholder::Anonymous).unwrap()
    }

    #[test]
    fn binds_arguments_in_order() {
        let client = client();
        let inserted = client
            .execute(&stmt(
                "INSERT INTO t (k, n, s) VALUES (?, ?, ?)",
                vec!["a".into(), SqlValue::Real(1.5), SqlValue::Null],
            ))
            .unwrap();
        assert_eq!(inserted, 1);

        let row = client
            .query_one(
                &stmt("SELECT k, n, s FROM t WHERE k = ?", vec!["a".into()]),
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .unwrap();
        assert_eq!(row, Some(("a".to_string(), 1.5, None)));
    }

    #[test]
    fn missing_rows_and_affected_counts() {
        let client = client();
        let none = client
            .query_one(&stmt("SELECT k FROM t WHERE k = ?", vec!["x".into()]), |row| {
                row.get::<_, String>(0)
            })
            .unwrap();
        assert_eq!(none, None);

        let updated = client
            .execute(&stmt("UPDATE t SET s = ? WHERE k = ?", vec!["v".into(), "x".into()]))
            .unwrap();
        assert_eq!(updated, 0);

        let all = client
            .query_many(&stmt("SELECT k FROM t", vec![]), |row| row.get::<_, String>(0))
            .unwrap();
        assert!(all.is_empty());
    }
}
