//! Rule evaluation for one aircraft snapshot.
//!
//! Rules run in priority order and the first one that matches owns the
//! outcome, whether it fires or is suppressed by its latch:
//!
//! 1. watchlist hit, latched until the state is reaped
//! 2. emergency squawk, fires on every change into an emergency code
//! 3. special category (military), latched until reaped
//! 4. proximity geofence, latched while inside and re-armed outside
//!
//! The decision and the state write happen inside one store critical
//! section. Enrichment runs afterwards, with the lock released.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::model::{AlertRecord, AlertState, Decision, TriggerKind};
use super::store::AlertStateStore;
use crate::enrichment::EnrichmentCache;
use crate::feed::ObjectSnapshot;
use crate::geo::{resolve_position, Geofence};
use crate::watchlist::WatchlistSet;

pub struct RuleEvaluator {
    geofence: Geofence,
    enrichment: Arc<EnrichmentCache>,
}

impl RuleEvaluator {
    pub fn new(geofence: Geofence, enrichment: Arc<EnrichmentCache>) -> Self {
        Self {
            geofence,
            enrichment,
        }
    }

    /// Evaluate a snapshot and, if a rule fires, enrich it into an alert.
    pub async fn evaluate(
        &self,
        snapshot: &ObjectSnapshot,
        watchlist: &WatchlistSet,
        store: &AlertStateStore,
    ) -> Option<AlertRecord> {
        let decision = self.decide(snapshot, watchlist, store, Utc::now())?;
        let detail = self.enrichment.lookup(&snapshot.hex).await;

        Some(AlertRecord {
            kind: decision.kind,
            snapshot: snapshot.clone(),
            detail,
            watchlist_entry: decision.watchlist_entry,
            distance_nm: decision.distance_nm,
        })
    }

    /// Pure rule pass: decide whether to alert and update the aircraft's
    /// state. `last_squawk` and `last_seen` are written on every path.
    pub fn decide(
        &self,
        snapshot: &ObjectSnapshot,
        watchlist: &WatchlistSet,
        store: &AlertStateStore,
        now: DateTime<Utc>,
    ) -> Option<Decision> {
        let entry = watchlist.contains(&snapshot.hex);

        store.with_state(&snapshot.hex, now, |state| {
            let decision = self.apply_rules(snapshot, entry, state);
            state.last_squawk = Some(snapshot.squawk.clone());
            state.last_seen = now;
            decision
        })
    }

    fn apply_rules(
        &self,
        snapshot: &ObjectSnapshot,
        watchlist_entry: Option<crate::watchlist::WatchlistEntry>,
        state: &mut AlertState,
    ) -> Option<Decision> {
        if let Some(entry) = watchlist_entry {
            // A watchlisted aircraft never reaches the emergency or special
            // rules, even once its watchlist latch has fired.
            return state.watchlist.fire().then(|| Decision {
                watchlist_entry: Some(entry),
                ..Decision::new(TriggerKind::Watchlist)
            });
        }

        if snapshot.is_emergency() {
            let changed = state.last_squawk.as_deref() != Some(snapshot.squawk.as_str());
            return changed.then(|| Decision::new(TriggerKind::Emergency));
        }

        if snapshot.is_special() {
            return state
                .special
                .fire()
                .then(|| Decision::new(TriggerKind::Special));
        }

        let Some(position) = resolve_position(snapshot) else {
            state.proximity.rearm();
            return None;
        };

        let distance = self.geofence.distance_from_home(position);
        if self.geofence.contains(distance, snapshot.altitude) {
            state.proximity.fire().then(|| Decision {
                distance_nm: Some(distance),
                ..Decision::new(TriggerKind::Proximity)
            })
        } else {
            state.proximity.rearm();
            None
        }
    }
}
