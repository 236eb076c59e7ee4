//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings. The unique
//! `(tenant_id, name)` index backs up the service's own name check when
//! two creates race.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "directory_nodes",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — directory nodes and their members
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Nodes (tenant scope, self-referencing hierarchy)
-- =======================================================================
DEFINE TABLE node SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE node TYPE string;
DEFINE FIELD name ON TABLE node TYPE string;
DEFINE FIELD description ON TABLE node TYPE string DEFAULT '';
DEFINE FIELD parent_id ON TABLE node TYPE option<string>;
DEFINE FIELD is_group ON TABLE node TYPE bool DEFAULT false;
DEFINE FIELD disabled ON TABLE node TYPE bool DEFAULT false;
DEFINE FIELD created_by ON TABLE node TYPE string;
DEFINE FIELD updated_by ON TABLE node TYPE string;
DEFINE FIELD created_at ON TABLE node TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE node TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_node_tenant_name ON TABLE node \
    COLUMNS tenant_id, name UNIQUE;
DEFINE INDEX idx_node_tenant_parent ON TABLE node \
    COLUMNS tenant_id, parent_id;

-- =======================================================================
-- Members (tenant scope, attached to one node)
-- =======================================================================
DEFINE TABLE member SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE member TYPE string;
DEFINE FIELD node_id ON TABLE member TYPE string;
DEFINE FIELD name ON TABLE member TYPE string;
DEFINE FIELD disabled ON TABLE member TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_tenant_node ON TABLE member \
    COLUMNS tenant_id, node_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the schema up to the latest version.
///
/// The `_migration` table records each applied version; only versions
/// above the recorded maximum are run, so calling this on every start
/// is cheap.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(db, migration).await?;
    }
    Ok(())
}

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    // DDL and its bookkeeping row commit together.
    let sql = format!(
        "BEGIN TRANSACTION; {} \
         CREATE _migration SET version = $version, name = $name; \
         COMMIT TRANSACTION;",
        migration.sql
    );
    db.query(sql)
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}': {e}",
                migration.version, migration.name
            ))
        })?;

    info!(version = migration.version, "Migration applied");
    Ok(())
}
