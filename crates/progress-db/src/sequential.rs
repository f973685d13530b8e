use progress_types::models::MAX_COMPLETED;
use tracing::{debug, warn};

use crate::error::DbError;
use crate::store::{Statement, Store, Value};

/// Outcome of a counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    Advanced,
    /// Counter was already at the cap; nothing was written.
    AtMaximum,
    /// No sequential row has this username; nothing was written.
    NoSuchUser,
}

/// Data access for the `sequentialUser` table.
pub struct SequentialUsers<'a> {
    store: &'a dyn Store,
}

impl<'a> SequentialUsers<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, username: &str, time: &str) -> Result<(), DbError> {
        self.store
            .execute(Statement::with_args(
                "INSERT INTO sequentialUser (username, time) VALUES (?1, ?2)",
                [username.into(), time.into()],
            ))
            .await?;
        Ok(())
    }

    /// Succeeds whether or not a row matched.
    pub async fn update_time(&self, username: &str, time: &str) -> Result<(), DbError> {
        self.store
            .execute(Statement::with_args(
                "UPDATE sequentialUser SET time = ?1 WHERE username = ?2",
                [time.into(), username.into()],
            ))
            .await?;
        Ok(())
    }

    /// Advance `completed` by one, never past [`MAX_COMPLETED`].
    ///
    /// The bound is checked inside the single UPDATE, so concurrent callers
    /// cannot lose increments or overshoot the cap.
    pub async fn increment_completed(&self, username: &str) -> Result<Increment, DbError> {
        let rows = self
            .store
            .execute(Statement::with_args(
                "UPDATE sequentialUser SET completed = completed + 1
                 WHERE username = ?1 AND completed < ?2",
                [username.into(), Value::Integer(i64::from(MAX_COMPLETED))],
            ))
            .await?;

        if rows.affected_row_count > 0 {
            return Ok(Increment::Advanced);
        }

        match self.read_completed(username).await {
            Ok(completed) => {
                warn!(
                    "User {} has already reached the maximum value of {} (at {})",
                    username, MAX_COMPLETED, completed
                );
                Ok(Increment::AtMaximum)
            }
            Err(DbError::NotFound) => {
                warn!("Increment for unknown sequential user {} changed nothing", username);
                Ok(Increment::NoSuchUser)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn read_completed(&self, username: &str) -> Result<u32, DbError> {
        let rows = self
            .store
            .execute(Statement::with_args(
                "SELECT completed FROM sequentialUser WHERE username = ?1",
                [username.into()],
            ))
            .await?;

        let Some(value) = rows.first_value() else {
            debug!("No sequential record for username {}", username);
            return Err(DbError::NotFound);
        };

        value
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| DbError::Protocol(format!("completed is not a count: {:?}", value)))
    }

    pub async fn delete(&self, username: &str) -> Result<(), DbError> {
        self.store
            .execute(Statement::with_args(
                "DELETE FROM sequentialUser WHERE username = ?1",
                [username.into()],
            ))
            .await?;
        Ok(())
    }

    pub async fn exists(&self, username: &str) -> Result<bool, DbError> {
        let rows = self
            .store
            .execute(Statement::with_args(
                "SELECT COUNT(username) AS count FROM sequentialUser WHERE username = ?1",
                [username.into()],
            ))
            .await?;

        rows.first_value()
            .and_then(Value::as_integer)
            .map(|count| count > 0)
            .ok_or_else(|| DbError::Protocol("COUNT returned no integer".into()))
    }
}
