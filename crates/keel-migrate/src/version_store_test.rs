use super::*;
use keel_db::{Database, DbError, DuckDbBackend, SqliteBackend};

#[test]
fn test_sqlite_schema_sql_is_interoperable() {
    let sql = VersionStore::new(Dialect::Sqlite).schema_sql();
    assert!(sql.contains(
        "CREATE TABLE IF NOT EXISTS schema_migrations (version uint64, dirty bool);"
    ));
    assert!(sql.contains(
        "CREATE UNIQUE INDEX IF NOT EXISTS version_unique ON schema_migrations (version);"
    ));
}

#[test]
fn test_duckdb_schema_sql_uses_native_types() {
    let sql = VersionStore::new(Dialect::DuckDb).schema_sql();
    assert!(sql.contains("(version UBIGINT, dirty BOOLEAN)"));
}

#[tokio::test]
async fn test_ensure_schema_is_idempotent() {
    let db = SqliteBackend::in_memory().unwrap();
    let store = VersionStore::new(db.dialect());

    let mut tx = db.begin().await.unwrap();
    store.ensure_schema(tx.as_mut()).await.unwrap();
    store.ensure_schema(tx.as_mut()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    store.ensure_schema(tx.as_mut()).await.unwrap();
    tx.commit().await.unwrap();

    assert!(db.relation_exists(VERSION_TABLE).await.unwrap());
    assert!(db.index_exists(VERSION_INDEX).await.unwrap());
    let typed = db
        .query_count(
            "SELECT * FROM pragma_table_info('schema_migrations') \
             WHERE (name = 'version' AND type = 'uint64') OR (name = 'dirty' AND type = 'bool')",
        )
        .await
        .unwrap();
    assert_eq!(typed, 2);
}

#[tokio::test]
async fn test_read_version_defaults_to_zero() {
    let db = SqliteBackend::in_memory().unwrap();
    let store = VersionStore::new(db.dialect());

    let mut tx = db.begin().await.unwrap();
    store.ensure_schema(tx.as_mut()).await.unwrap();
    assert_eq!(store.read_version(tx.as_mut()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_read_version_requires_schema() {
    let db = SqliteBackend::in_memory().unwrap();
    let store = VersionStore::new(db.dialect());

    let mut tx = db.begin().await.unwrap();
    let err = store.read_version(tx.as_mut()).await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)), "{err}");
}

#[tokio::test]
async fn test_write_version_keeps_single_row() {
    let db = SqliteBackend::in_memory().unwrap();
    let store = VersionStore::new(db.dialect());

    let mut tx = db.begin().await.unwrap();
    store.ensure_schema(tx.as_mut()).await.unwrap();
    store.write_version(tx.as_mut(), 3).await.unwrap();
    store.write_version(tx.as_mut(), 1).await.unwrap();
    assert_eq!(store.read_version(tx.as_mut()).await.unwrap(), 1);
    tx.commit().await.unwrap();

    assert_eq!(
        db.query_count("SELECT * FROM schema_migrations").await.unwrap(),
        1
    );
    assert_eq!(
        db.query_count("SELECT * FROM schema_migrations WHERE version = 1 AND dirty = false")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_duckdb_round_trip() {
    let db = DuckDbBackend::in_memory().unwrap();
    let store = VersionStore::new(db.dialect());

    let mut tx = db.begin().await.unwrap();
    store.ensure_schema(tx.as_mut()).await.unwrap();
    assert_eq!(store.read_version(tx.as_mut()).await.unwrap(), 0);
    store.write_version(tx.as_mut(), 4).await.unwrap();
    assert_eq!(store.read_version(tx.as_mut()).await.unwrap(), 4);
    tx.commit().await.unwrap();

    assert!(db.relation_exists(VERSION_TABLE).await.unwrap());
    assert!(db.index_exists(VERSION_INDEX).await.unwrap());
    assert_eq!(
        db.query_count("SELECT * FROM schema_migrations").await.unwrap(),
        1
    );
}
