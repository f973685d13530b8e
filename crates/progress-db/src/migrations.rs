use tracing::info;

use crate::error::DbError;
use crate::store::{Statement, Store};

const CREATE_SEQUENTIAL: &str = "
    CREATE TABLE IF NOT EXISTS sequentialUser (
        username    TEXT,
        time        TEXT,
        completed   INT DEFAULT 0,

        CONSTRAINT max_value_check CHECK (completed <= 683),
        CONSTRAINT pk_sequentialUser PRIMARY KEY (username)
    )";

const CREATE_RANDOM: &str = "
    CREATE TABLE IF NOT EXISTS randomUser (
        username    TEXT,
        time        TEXT,

        CONSTRAINT pk_randomUser PRIMARY KEY (username)
    )";

/// Create both tables when missing. Existing tables are left untouched.
pub async fn run(store: &dyn Store) -> Result<(), DbError> {
    for sql in [CREATE_SEQUENTIAL, CREATE_RANDOM] {
        store.execute(Statement::new(sql)).await?;
    }

    info!("Database migrations complete");
    Ok(())
}
