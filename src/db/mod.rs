//! SQLite persistence for places, trips and route stops.
//!
//! A [`Database`] owns one connection. Call [`Database::ensure_schema`] once
//! after opening and before any repository method.

mod schema;
pub mod attachments;
pub mod places;
pub mod reset;
pub mod trip_places;
pub mod trips;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub use schema::{MIGRATIONS, SCHEMA_VERSION};
pub use places::{filter_places, NewPlace, Place, PlacePatch};
pub use reset::ResetSummary;
pub use trip_places::{visit_date_today, Direction, TripPlace, TripPlacePatch, TripPlaceWithPlace};
pub use trips::{NewTrip, Trip, TripPatch};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Photo list encoding error: {0}")]
    Photos(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Photo storage error: {0}")]
    Photo(#[from] crate::photos::PhotoError),
    #[error("Migration to schema version {version} failed: {source}")]
    Migration {
        version: i32,
        #[source]
        source: rusqlite::Error,
    },
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "Opened database");
        Ok(Self { conn })
    }

    /// In-memory database with foreign keys on. Schema is not created yet.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// Current value of the persisted schema-version marker.
    pub fn schema_version(&self) -> Result<i32> {
        let version = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    /// Bring the schema up to [`SCHEMA_VERSION`].
    ///
    /// Already-current databases are left untouched: only the marker is read.
    /// Pending migrations run in increasing order, each once, and the marker is
    /// bumped after every step. A failed step is returned as
    /// [`DbError::Migration`] and must be treated as fatal.
    pub fn ensure_schema(&self) -> Result<()> {
        let current = self.schema_version()?;
        if current >= SCHEMA_VERSION {
            debug!(version = current, "Schema is current");
            return Ok(());
        }

        for &(version, sql) in MIGRATIONS {
            if version <= current {
                continue;
            }
            info!(from = version - 1, to = version, "Applying schema migration");
            self.conn
                .execute_batch(sql)
                .map_err(|source| DbError::Migration { version, source })?;
            self.conn
                .pragma_update(None, "user_version", version)
                .map_err(|source| DbError::Migration { version, source })?;
        }

        Ok(())
    }
}

/// Fresh entity id: `<prefix>_<unix millis>_<8 base36 chars>`.
pub(crate) fn new_id(prefix: &str) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Dates are `YYYY-MM-DD`; a full timestamp keeps only its date part.
pub(crate) fn parse_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn encode_photos(photos: &[String]) -> Result<String> {
    Ok(serde_json::to_string(photos)?)
}

/// NULL reads as an empty list.
pub(crate) fn decode_photos(idx: usize, raw: Option<String>) -> rusqlite::Result<Vec<String>> {
    match raw {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(Vec::new()),
    }
}
