//! Aircraft watchlist: the set of ICAO hex codes that always alert.
//!
//! The source is the plane-alert-db CSV. A refresh parses the whole file into
//! a new map and swaps it in behind an `Arc`, so readers see either the old
//! complete set or the new complete set, never a partial one.

pub mod refresher;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Column offsets in the plane-alert-db CSV.
const COL_ICAO: usize = 0;
const COL_REGISTRATION: usize = 1;
const COL_TYPE: usize = 4;
const COL_NOTE: usize = 6;
const MIN_COLUMNS: usize = COL_NOTE + 1;

/// Watchlist source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistConfig {
    #[serde(default = "default_watchlist_url")]
    pub url: String,
    #[serde(default = "default_refresh_hours")]
    pub refresh_hours: u64,
}

fn default_watchlist_url() -> String {
    "https://raw.githubusercontent.com/sdr-enthusiasts/plane-alert-db/main/plane-alert-db-images.csv"
        .to_string()
}

fn default_refresh_hours() -> u64 {
    24
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            url: default_watchlist_url(),
            refresh_hours: default_refresh_hours(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub icao: String,
    pub registration: String,
    pub note: String,
    pub plane_type: String,
}

pub type WatchlistMap = HashMap<String, WatchlistEntry>;

/// Shared, atomically replaced watchlist.
#[derive(Default)]
pub struct WatchlistSet {
    entries: RwLock<Arc<WatchlistMap>>,
}

impl WatchlistSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` and replace the active set. Returns the new size.
    pub fn refresh(&self, source: &str) -> usize {
        let parsed = parse_watchlist(source);
        let count = parsed.len();
        self.replace(parsed);
        count
    }

    pub fn replace(&self, entries: WatchlistMap) {
        *self.entries.write() = Arc::new(entries);
    }

    /// Current set. The returned `Arc` stays valid across later refreshes.
    pub fn snapshot(&self) -> Arc<WatchlistMap> {
        self.entries.read().clone()
    }

    /// Look up an ICAO hex, case-insensitively.
    pub fn contains(&self, icao: &str) -> Option<WatchlistEntry> {
        self.entries.read().get(&normalize_icao(icao)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// The feed reports hex in lowercase, plane-alert-db in uppercase.
fn normalize_icao(icao: &str) -> String {
    icao.trim().to_ascii_uppercase()
}

/// Parse watchlist CSV text. The first row is a header. Rows with fewer than
/// seven columns, or an empty ICAO, are skipped.
pub fn parse_watchlist(source: &str) -> WatchlistMap {
    let mut entries = HashMap::new();

    for row in split_records(source).into_iter().skip(1) {
        if row.len() < MIN_COLUMNS {
            continue;
        }
        let icao = normalize_icao(&row[COL_ICAO]);
        if icao.is_empty() {
            continue;
        }
        entries.insert(
            icao.clone(),
            WatchlistEntry {
                icao,
                registration: row[COL_REGISTRATION].trim().to_string(),
                plane_type: row[COL_TYPE].trim().to_string(),
                note: row[COL_NOTE].trim().to_string(),
            },
        );
    }

    entries
}

/// Split CSV text into records of fields.
///
/// Handles quoted fields containing commas, newlines and doubled quotes, and
/// both `\n` and `\r\n` line endings. Blank lines produce no record.
fn split_records(source: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                if !record.is_empty() || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
            }
            _ => field.push(c),
        }
    }

    if !record.is_empty() || !field.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}
