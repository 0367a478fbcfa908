//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Enums are stored as strings with ASSERT constraints for validation.

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
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (record id = guid, name is the unique public key)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD guid ON TABLE organization TYPE string;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD full_name ON TABLE organization TYPE string;
DEFINE FIELD org_type ON TABLE organization TYPE option<string>;
DEFINE FIELD validator_client_name ON TABLE organization TYPE string;
DEFINE FIELD validator_public_key ON TABLE organization TYPE string;
DEFINE FIELD validator_key_fingerprint ON TABLE organization TYPE string;
DEFINE FIELD assigned_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_name ON TABLE organization \
    COLUMNS name UNIQUE;

-- =======================================================================
-- Reindex jobs
-- =======================================================================
DEFINE TABLE reindex_job SCHEMAFULL;
DEFINE FIELD organization_guid ON TABLE reindex_job TYPE string;
DEFINE FIELD organization_name ON TABLE reindex_job TYPE string;
DEFINE FIELD status ON TABLE reindex_job TYPE string \
    ASSERT $value IN ['pending', 'running', 'partial_failure', \
    'completed'];
DEFINE FIELD per_type_progress ON TABLE reindex_job TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD started_at ON TABLE reindex_job TYPE datetime;
DEFINE FIELD finished_at ON TABLE reindex_job TYPE option<datetime>;
DEFINE INDEX idx_reindex_job_org ON TABLE reindex_job \
    COLUMNS organization_guid;

-- =======================================================================
-- Search documents (record id = org guid/type/object id, overwrite on put)
-- =======================================================================
DEFINE TABLE search_document SCHEMAFULL;
DEFINE FIELD org_guid ON TABLE search_document TYPE string;
DEFINE FIELD object_type ON TABLE search_document TYPE string;
DEFINE FIELD object_id ON TABLE search_document TYPE string;
DEFINE FIELD document ON TABLE search_document TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD indexed_at ON TABLE search_document TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_search_document_org_type ON TABLE search_document \
    COLUMNS org_guid, object_type;

-- =======================================================================
-- Organization objects (read view of the platform object store)
-- =======================================================================
DEFINE TABLE org_object SCHEMAFULL;
DEFINE FIELD org_guid ON TABLE org_object TYPE string;
DEFINE FIELD object_type ON TABLE org_object TYPE string \
    ASSERT $value IN ['node', 'role', 'environment', 'data_bag', \
    'data_bag_item', 'client'];
DEFINE FIELD object_id ON TABLE org_object TYPE string;
DEFINE FIELD body ON TABLE org_object TYPE object FLEXIBLE DEFAULT {};
DEFINE INDEX idx_org_object_key ON TABLE org_object \
    COLUMNS org_guid, object_type, object_id UNIQUE;
";

/// Bring the database up to the latest schema version.
///
/// Versions at or below the highest recorded in `_migration` are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = applied_version(db).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > applied);

    for migration in pending {
        info!(version = migration.version, name = migration.name, "Applying migration");

        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!("v{} {}: {e}", migration.version, migration.name))
        })?;
        record(db, migration).await?;
    }

    Ok(())
}

async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version, name FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let latest: Vec<MigrationRecord> = result.take(0)?;
    Ok(latest.first().map_or(0, |m| m.version))
}

async fn record<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!("recording v{}: {e}", migration.version))
        })?;
    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
