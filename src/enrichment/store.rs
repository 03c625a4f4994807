//! Backing stores for the enrichment cache.
//!
//! `SqliteDetailStore` persists details in `aircraft_details`; `NullStore`
//! always misses and discards writes, for deployments without a database.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::EnrichmentDetail;
use crate::error::StoreError;

/// Persistent key-value store for normalized details, keyed by ICAO hex.
///
/// Implementations must be safe to call from several pollers at once.
pub trait DetailStore: Send + Sync {
    fn get(&self, icao: &str) -> Result<Option<EnrichmentDetail>, StoreError>;

    /// Insert or overwrite. Idempotent.
    fn upsert(&self, icao: &str, detail: &EnrichmentDetail) -> Result<(), StoreError>;
}

/// Always-miss store.
#[derive(Debug, Default)]
pub struct NullStore;

impl DetailStore for NullStore {
    fn get(&self, _icao: &str) -> Result<Option<EnrichmentDetail>, StoreError> {
        Ok(None)
    }

    fn upsert(&self, _icao: &str, _detail: &EnrichmentDetail) -> Result<(), StoreError> {
        Ok(())
    }
}

/// SQLite-backed detail cache.
///
/// The connection is not `Sync`, so it sits behind a mutex; lookups are
/// single-row primary-key reads and never hold the lock for long.
pub struct SqliteDetailStore {
    conn: Mutex<Connection>,
}

impl SqliteDetailStore {
    /// Open a database at an explicit path, creating parent directories.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of cached aircraft.
    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM aircraft_details", [], |row| row.get(0))?)
    }
}

impl DetailStore for SqliteDetailStore {
    fn get(&self, icao: &str) -> Result<Option<EnrichmentDetail>, StoreError> {
        let conn = self.conn.lock();
        let detail = conn
            .query_row(
                "SELECT hex, registration, aircraft_type, owner, airline,
                        thumbnail_url, full_image_url
                 FROM aircraft_details WHERE hex = ?1",
                [icao],
                |row| {
                    Ok(EnrichmentDetail {
                        icao: row.get(0)?,
                        registration: row.get(1)?,
                        aircraft_type: row.get(2)?,
                        owner: row.get(3)?,
                        airline: row.get(4)?,
                        thumbnail_url: row.get(5)?,
                        full_image_url: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(detail)
    }

    fn upsert(&self, icao: &str, detail: &EnrichmentDetail) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO aircraft_details
                (hex, registration, aircraft_type, owner, airline,
                 thumbnail_url, full_image_url, last_fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(hex) DO UPDATE SET
                registration = excluded.registration,
                aircraft_type = excluded.aircraft_type,
                owner = excluded.owner,
                airline = excluded.airline,
                thumbnail_url = excluded.thumbnail_url,
                full_image_url = excluded.full_image_url,
                last_fetched_at = excluded.last_fetched_at",
            params![
                icao,
                detail.registration,
                detail.aircraft_type,
                detail.owner,
                detail.airline,
                detail.thumbnail_url,
                detail.full_image_url,
                now,
            ],
        )?;
        Ok(())
    }
}
