use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::period::Period;

/// Store layout version this build implements. Opening a file whose
/// `PRAGMA user_version` differs is refused.
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = include_str!("schema.sql");

/// Handle to one on-disk meter-ledger store.
///
/// The pool is capped at a single connection: the store is a
/// single-process, single-writer file and nothing here coordinates
/// concurrent access from other processes.
#[derive(Debug)]
pub struct Store {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Creates a new store file and seeds `next_date` with the first
    /// reporting period. Initial readings registered afterwards via
    /// `add_meter` land one month earlier.
    pub async fn create(path: impl AsRef<Path>, first_period: Period) -> Result<(), StoreError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        sqlx::query("INSERT OR REPLACE INTO service (skey, value) VALUES ('next_date', ?)")
            .bind(first_period.date())
            .execute(&pool)
            .await?;
        pool.close().await;

        tracing::info!(path = %path.display(), period = %first_period, "store created");
        Ok(())
    }

    /// Opens an existing store, verifying the layout version first.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            path: path.to_path_buf(),
        };
        let found = store.version().await?;
        if found != SCHEMA_VERSION {
            store.close().await;
            return Err(StoreError::UnsupportedVersion {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(store)
    }

    /// Releases the handle. Taking `self` by value makes a second
    /// close unrepresentable.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// The stored layout version marker.
    pub async fn version(&self) -> Result<i32, StoreError> {
        let version: i32 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    /// Path of the backing store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
