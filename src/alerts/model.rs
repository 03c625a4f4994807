//! Alert trigger kinds, per-aircraft latch state and the alert record handed
//! to notification sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enrichment::EnrichmentDetail;
use crate::feed::ObjectSnapshot;
use crate::watchlist::WatchlistEntry;

/// Which rule produced an alert. Also the routing key for notification sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Watchlist,
    Emergency,
    Special,
    Proximity,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Watchlist => "watchlist",
            TriggerKind::Emergency => "emergency",
            TriggerKind::Special => "special",
            TriggerKind::Proximity => "proximity",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-trigger dedup latch.
///
/// `Armed` means the next match alerts; `Alerted` suppresses further alerts
/// until the latch is re-armed. Watchlist and special latches are only
/// re-armed by reaping the whole state; proximity re-arms itself whenever
/// the aircraft is outside the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latch {
    #[default]
    Armed,
    Alerted,
}

impl Latch {
    /// Transition `Armed -> Alerted`. Returns true if this call fired.
    pub fn fire(&mut self) -> bool {
        match self {
            Latch::Armed => {
                *self = Latch::Alerted;
                true
            }
            Latch::Alerted => false,
        }
    }

    pub fn rearm(&mut self) {
        *self = Latch::Armed;
    }

    pub fn is_alerted(&self) -> bool {
        *self == Latch::Alerted
    }
}

/// Everything remembered about one aircraft between polls.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    /// Squawk seen on the previous evaluation. `None` before the first one.
    pub last_squawk: Option<String>,
    pub watchlist: Latch,
    pub special: Latch,
    pub proximity: Latch,
    pub last_seen: DateTime<Utc>,
}

impl AlertState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_squawk: None,
            watchlist: Latch::Armed,
            special: Latch::Armed,
            proximity: Latch::Armed,
            last_seen: now,
        }
    }
}

/// Outcome of rule evaluation before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub kind: TriggerKind,
    pub watchlist_entry: Option<WatchlistEntry>,
    /// Distance from home, set for proximity alerts.
    pub distance_nm: Option<f64>,
}

impl Decision {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            watchlist_entry: None,
            distance_nm: None,
        }
    }
}

/// A fired alert, enriched and ready for dispatch.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub kind: TriggerKind,
    pub snapshot: ObjectSnapshot,
    pub detail: EnrichmentDetail,
    pub watchlist_entry: Option<WatchlistEntry>,
    pub distance_nm: Option<f64>,
}
