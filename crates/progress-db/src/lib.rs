pub mod error;
pub mod local;
pub mod migrations;
pub mod random;
pub mod remote;
pub mod sequential;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use progress_types::models::UserKind;

pub use error::DbError;
pub use local::LocalStore;
pub use random::RandomUsers;
pub use remote::RemoteStore;
pub use sequential::{Increment, SequentialUsers};
pub use store::{Rows, Statement, Store, Value};

/// Handle shared by every request. Cloning is cheap; all clones talk to the
/// same store.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn Store>,
}

impl Database {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open the store named by `url` and make sure both tables exist.
    ///
    /// `libsql://`, `https://` and `http://` URLs go to a remote server;
    /// `:memory:`, `file:<path>` or a bare path open a local SQLite file.
    pub async fn connect(url: &str, auth_token: Option<String>) -> Result<Self, DbError> {
        let store: Arc<dyn Store> = if url.contains("://") {
            Arc::new(RemoteStore::new(url, auth_token)?)
        } else if url == ":memory:" {
            Arc::new(LocalStore::open_in_memory()?)
        } else {
            let path = url.strip_prefix("file:").unwrap_or(url);
            if path.is_empty() {
                return Err(DbError::InvalidUrl(url.to_string()));
            }
            Arc::new(LocalStore::open(Path::new(path))?)
        };

        migrations::run(store.as_ref()).await?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn sequential(&self) -> SequentialUsers<'_> {
        SequentialUsers::new(self.store.as_ref())
    }

    pub fn random(&self) -> RandomUsers<'_> {
        RandomUsers::new(self.store.as_ref())
    }

    /// Which table holds `username`. Both are checked; a sequential row wins
    /// over a random one.
    pub async fn lookup(&self, username: &str) -> Result<UserKind, DbError> {
        let sequential = self.sequential();
        let random = self.random();
        let (in_sequential, in_random) =
            tokio::try_join!(sequential.exists(username), random.exists(username))?;

        Ok(if in_sequential {
            UserKind::Sequential
        } else if in_random {
            UserKind::Random
        } else {
            UserKind::DoesNotExist
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_prefers_sequential() {
        let db = Database::connect(":memory:", None).await.unwrap();

        assert_eq!(db.lookup("ghost").await.unwrap(), UserKind::DoesNotExist);

        db.random().create("carol", "07:00").await.unwrap();
        assert_eq!(db.lookup("carol").await.unwrap(), UserKind::Random);

        db.sequential().create("carol", "07:00").await.unwrap();
        assert_eq!(db.lookup("carol").await.unwrap(), UserKind::Sequential);
    }

    #[tokio::test]
    async fn rejects_empty_file_url() {
        assert!(matches!(
            Database::connect("file:", None).await,
            Err(DbError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn lookup_fails_when_tables_are_missing() {
        let db = Database::new(Arc::new(LocalStore::open_in_memory().unwrap()));
        assert!(db.lookup("anyone").await.is_err());
    }
}
