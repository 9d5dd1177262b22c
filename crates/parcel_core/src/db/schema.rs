//! Parcel table DDL.

use super::DbResult;
use rusqlite::Connection;

/// Name of the single table backing the parcel store.
pub const PARCEL_TABLE: &str = "parcel";

const PARCEL_SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the `parcel` table and its client index when absent.
///
/// Safe to call on every open; existing rows are left untouched.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(PARCEL_SCHEMA_SQL)?;
    Ok(())
}
