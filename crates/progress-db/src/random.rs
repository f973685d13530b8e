use crate::error::DbError;
use crate::store::{Statement, Store, Value};

/// Data access for the `randomUser` table. Same contracts as the sequential
/// table, minus the counter.
pub struct RandomUsers<'a> {
    store: &'a dyn Store,
}

impl<'a> RandomUsers<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, username: &str, time: &str) -> Result<(), DbError> {
        self.store
            .execute(Statement::with_args(
                "INSERT INTO randomUser (username, time) VALUES (?1, ?2)",
                [username.into(), time.into()],
            ))
            .await?;
        Ok(())
    }

    pub async fn update_time(&self, username: &str, time: &str) -> Result<(), DbError> {
        self.store
            .execute(Statement::with_args(
                "UPDATE randomUser SET time = ?1 WHERE username = ?2",
                [time.into(), username.into()],
            ))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, username: &str) -> Result<(), DbError> {
        self.store
            .execute(Statement::with_args(
                "DELETE FROM randomUser WHERE username = ?1",
                [username.into()],
            ))
            .await?;
        Ok(())
    }

    pub async fn exists(&self, username: &str) -> Result<bool, DbError> {
        let rows = self
            .store
            .execute(Statement::with_args(
                "SELECT COUNT(username) AS count FROM randomUser WHERE username = ?1",
                [username.into()],
            ))
            .await?;

        rows.first_value()
            .and_then(Value::as_integer)
            .map(|count| count > 0)
            .ok_or_else(|| DbError::Protocol("COUNT returned no integer".into()))
    }
}
