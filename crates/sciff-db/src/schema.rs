//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings and enums as
//! strings with ASSERT constraints.

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
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD username ON TABLE account TYPE string;
DEFINE FIELD kind ON TABLE account TYPE string \
    ASSERT $value IN ['Standard', 'Privileged'];
DEFINE FIELD school_id ON TABLE account TYPE option<string>;
DEFINE FIELD session_token ON TABLE account TYPE option<string>;
DEFINE FIELD last_activity_at ON TABLE account TYPE option<datetime>;
DEFINE FIELD is_active ON TABLE account TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_username ON TABLE account \
    COLUMNS username UNIQUE;

-- =======================================================================
-- Login activity (one record per login instance)
-- =======================================================================
DEFINE TABLE login_activity SCHEMAFULL;
DEFINE FIELD account_id ON TABLE login_activity TYPE string;
DEFINE FIELD school_id ON TABLE login_activity TYPE option<string>;
DEFINE FIELD session_token ON TABLE login_activity TYPE string;
DEFINE FIELD ip_address ON TABLE login_activity TYPE option<string>;
DEFINE FIELD user_agent ON TABLE login_activity TYPE option<string>;
DEFINE FIELD country ON TABLE login_activity TYPE option<string>;
DEFINE FIELD city ON TABLE login_activity TYPE option<string>;
DEFINE FIELD logged_in_at ON TABLE login_activity TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD logged_out_at ON TABLE login_activity TYPE option<datetime>;
DEFINE INDEX idx_login_activity_account_token ON TABLE login_activity \
    COLUMNS account_id, session_token;

-- =======================================================================
-- School subscriptions (entitlement grants)
-- =======================================================================
DEFINE TABLE school_subscription SCHEMAFULL;
DEFINE FIELD school_id ON TABLE school_subscription TYPE string;
DEFINE FIELD category_id ON TABLE school_subscription TYPE string;
DEFINE FIELD start_date ON TABLE school_subscription TYPE datetime;
DEFINE FIELD expiry_date ON TABLE school_subscription TYPE datetime;
DEFINE FIELD active ON TABLE school_subscription TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE school_subscription TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE school_subscription TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_subscription_school_category ON TABLE school_subscription \
    COLUMNS school_id, category_id;

-- =======================================================================
-- Films
-- =======================================================================
DEFINE TABLE film SCHEMAFULL;
DEFINE FIELD title ON TABLE film TYPE string;
DEFINE FIELD category_id ON TABLE film TYPE string;
DEFINE FIELD external_url ON TABLE film TYPE string;
DEFINE FIELD is_active ON TABLE film TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE film TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE film TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Viewing logs
-- =======================================================================
DEFINE TABLE viewing_log SCHEMAFULL;
DEFINE FIELD school_id ON TABLE viewing_log TYPE string;
DEFINE FIELD film_id ON TABLE viewing_log TYPE string;
DEFINE FIELD account_id ON TABLE viewing_log TYPE string;
DEFINE FIELD started_at ON TABLE viewing_log TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD ended_at ON TABLE viewing_log TYPE option<datetime>;
DEFINE FIELD watched_seconds ON TABLE viewing_log TYPE int DEFAULT 0;
DEFINE FIELD ip_address ON TABLE viewing_log TYPE option<string>;
DEFINE FIELD device_info ON TABLE viewing_log TYPE option<string>;
DEFINE FIELD watermark_id ON TABLE viewing_log TYPE string;
DEFINE INDEX idx_viewing_log_school ON TABLE viewing_log \
    COLUMNS school_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the recorded maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in [
            "account",
            "login_activity",
            "school_subscription",
            "film",
            "viewing_log",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
