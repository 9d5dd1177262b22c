//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD API over the `parcel` table.
//! - Enforce the registered-only rule for address changes and deletion.
//!
//! # Invariants
//! - Every operation issues exactly one SQL statement.
//! - `add` ignores caller-provided number, status and timestamp.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{DbError, PARCEL_TABLE};
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

const REQUIRED_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Status-gated write that was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelAction {
    ChangeAddress,
    Delete,
}

/// Errors from parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite error.
    Db(DbError),
    /// No row with this number.
    NotFound(ParcelNumber),
    /// Gated write matched no row: the parcel is missing or past `registered`.
    NotRegistered {
        number: ParcelNumber,
        action: ParcelAction,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid parcel.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::NotRegistered {
                number,
                action: ParcelAction::ChangeAddress,
            } => write!(
                f,
                "parcel {number}: address can only be changed if the parcel is in 'registered' status"
            ),
            Self::NotRegistered {
                number,
                action: ParcelAction::Delete,
            } => write!(
                f,
                "parcel {number}: parcel can only be deleted if it is in 'registered' status"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "parcel repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "parcel repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::NotRegistered { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel CRUD operations.
pub trait ParcelRepository {
    /// Stores a new parcel in `registered` status and returns its number.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel; `NotFound` when the number is unknown.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists every parcel of a client, possibly empty.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status regardless of the current one.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Changes the address of a registered parcel.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Removes a registered parcel.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Constructs a repository from a connection that already has the
    /// `parcel` table (see `db::ensure_schema`).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client.0,
                ParcelStatus::Registered.as_str(),
                parcel.address.as_str(),
                format_timestamp(Utc::now()),
            ],
        )?;

        Ok(ParcelNumber(self.conn.last_insert_rowid()))
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;

        let mut rows = stmt.query([number.0])?;
        match rows.next()? {
            Some(row) => parse_parcel_row(row),
            None => Err(RepoError::NotFound(number)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARCEL_SELECT_SQL}
             WHERE client = ?1
             ORDER BY number ASC;"
        ))?;

        let mut rows = stmt.query([client.0])?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status.as_str(), number.0],
        )?;
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel
             SET address = ?1
             WHERE number = ?2
               AND status = ?3;",
            params![address, number.0, ParcelStatus::Registered.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotRegistered {
                number,
                action: ParcelAction::ChangeAddress,
            });
        }

        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM parcel
             WHERE number = ?1
               AND status = ?2;",
            params![number.0, ParcelStatus::Registered.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotRegistered {
                number,
                action: ParcelAction::Delete,
            });
        }

        Ok(())
    }
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let number = ParcelNumber(row.get("number")?);

    let client = ClientId(required_column(row, "client", number)?);

    let status_text: String = required_column(row, "status", number)?;
    let status = ParcelStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in parcel.status for parcel {number}"
        ))
    })?;

    let address: String = required_column(row, "address", number)?;

    let created_text: String = required_column(row, "created_at", number)?;
    let created_at = parse_timestamp(&created_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid RFC3339 timestamp `{created_text}` in parcel.created_at for parcel {number}"
        ))
    })?;

    Ok(Parcel {
        number,
        client,
        status,
        address,
        created_at,
    })
}

/// Reads a column that tables created outside this crate may leave NULL.
fn required_column<T: FromSql>(
    row: &Row<'_>,
    column: &'static str,
    number: ParcelNumber,
) -> RepoResult<T> {
    row.get::<_, Option<T>>(column)?.ok_or_else(|| {
        RepoError::InvalidData(format!("NULL in parcel.{column} for parcel {number}"))
    })
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn ensure_parcel_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, PARCEL_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamps_are_written_with_second_precision_and_z_suffix() {
        let value = Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 5).unwrap();
        assert_eq!(format_timestamp(value), "2024-03-09T17:04:05Z");
    }

    #[test]
    fn parse_timestamp_normalizes_offsets_to_utc() {
        let parsed = parse_timestamp("2024-03-09T20:04:05+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 5).unwrap());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
