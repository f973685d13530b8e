use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, params_from_iter};
use tracing::info;

use crate::error::DbError;
use crate::store::{Rows, Statement, Store, Value};

/// SQLite file (or in-memory) database behind a single connection.
#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("Local database opened at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn execute(&self, statement: Statement) -> Result<Rows, DbError> {
        let conn = self.conn.clone();

        // rusqlite is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| DbError::Poisoned(e.to_string()))?;
            run_statement(&conn, &statement)
        })
        .await?
    }
}

fn run_statement(conn: &Connection, statement: &Statement) -> Result<Rows, DbError> {
    let mut stmt = conn.prepare(&statement.sql)?;
    let column_count = stmt.column_count();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params_from_iter(statement.args.iter()))?;
    while let Some(row) = cursor.next()? {
        let values = (0..column_count)
            .map(|i| row.get_ref(i).map(Value::from))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(values);
    }
    drop(cursor);

    // Only writes report changes; a SELECT would echo the previous write's count.
    let affected_row_count = if column_count == 0 { conn.changes() } else { 0 };

    Ok(Rows {
        rows,
        affected_row_count,
    })
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_rows_and_affected_counts() {
        let store = LocalStore::open_in_memory().unwrap();
        store
            .execute(Statement::new("CREATE TABLE t (k TEXT PRIMARY KEY, n INT, b BLOB)"))
            .await
            .unwrap();

        let inserted = store
            .execute(Statement::with_args(
                "INSERT INTO t (k, n, b) VALUES (?1, ?2, ?3)",
                [Value::from("a"), Value::Integer(7), Value::Blob(vec![1, 2])],
            ))
            .await
            .unwrap();
        assert_eq!(inserted.affected_row_count, 1);

        let selected = store
            .execute(Statement::with_args(
                "SELECT k, n, b, NULL FROM t WHERE k = ?1",
                [Value::from("a")],
            ))
            .await
            .unwrap();
        assert_eq!(selected.affected_row_count, 0);
        assert_eq!(
            selected.rows,
            vec![vec![
                Value::Text("a".into()),
                Value::Integer(7),
                Value::Blob(vec![1, 2]),
                Value::Null,
            ]]
        );
    }

    #[tokio::test]
    async fn duplicate_primary_key_is_a_constraint_error() {
        let store = LocalStore::open_in_memory().unwrap();
        store
            .execute(Statement::new("CREATE TABLE t (k TEXT PRIMARY KEY)"))
            .await
            .unwrap();
        let insert = || Statement::with_args("INSERT INTO t (k) VALUES (?1)", [Value::from("a")]);

        store.execute(insert()).await.unwrap();
        let err = store.execute(insert()).await.unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn update_without_match_affects_nothing() {
        let store = LocalStore::open_in_memory().unwrap();
        store
            .execute(Statement::new("CREATE TABLE t (k TEXT PRIMARY KEY, n INT)"))
            .await
            .unwrap();

        let updated = store
            .execute(Statement::with_args(
                "UPDATE t SET n = 1 WHERE k = ?1",
                [Value::from("missing")],
            ))
            .await
            .unwrap();
        assert_eq!(updated.affected_row_count, 0);
    }
}
