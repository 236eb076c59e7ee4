//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn fresh_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = fresh_db().await;
    arbor_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info_str = format!("{:?}", info.expect("INFO FOR DB should return a value"));

    assert!(info_str.contains("node"), "missing node table");
    assert!(info_str.contains("member"), "missing member table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = fresh_db().await;

    arbor_db::run_migrations(&db).await.unwrap();
    arbor_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unique_index_rejects_duplicate_name_in_same_tenant() {
    let db = fresh_db().await;
    arbor_db::run_migrations(&db).await.unwrap();

    let insert = "CREATE node SET tenant_id = $tenant, name = 'Electronics', \
                  created_by = $tenant, updated_by = $tenant";

    db.query(insert)
        .bind(("tenant", "tenant-a"))
        .await
        .unwrap()
        .check()
        .unwrap();

    let duplicate = db
        .query(insert)
        .bind(("tenant", "tenant-a"))
        .await
        .unwrap()
        .check();
    assert!(duplicate.is_err(), "duplicate name should be rejected");

    let other_tenant = db
        .query(insert)
        .bind(("tenant", "tenant-b"))
        .await
        .unwrap()
        .check();
    assert!(other_tenant.is_ok(), "same name in another tenant is allowed");
}
