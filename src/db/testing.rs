//! Shared fixtures for the db tests: a freshly created store on a
//! temp dir, loaded with the seed data set. The pending period of the
//! seeded store is 2022-03.

use tempfile::TempDir;

use crate::db::Store;
use crate::period::Period;

const SEED: &str = include_str!("seed_test.sql");

pub(crate) async fn seeded_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ledger.sqlite");

    Store::create(&path, Period::new(2022, 3).expect("period"))
        .await
        .expect("create store");
    let store = Store::open(&path).await.expect("open store");
    sqlx::raw_sql(SEED)
        .execute(store.pool())
        .await
        .expect("load seed data");
    (dir, store)
}
