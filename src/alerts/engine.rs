//! Per-cycle alert pipeline.
//!
//! Evaluates every snapshot of one poll in feed order, dispatches whatever
//! fires, then reaps states that have gone stale. Shared by all feed pollers.

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::evaluator::RuleEvaluator;
use super::store::AlertStateStore;
use crate::feed::ObjectSnapshot;
use crate::notification::Dispatcher;
use crate::watchlist::WatchlistSet;

/// Counts from one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub processed: usize,
    pub alerts: usize,
    pub delivered: usize,
    pub reaped: usize,
}

pub struct AlertEngine {
    evaluator: RuleEvaluator,
    watchlist: Arc<WatchlistSet>,
    states: Arc<AlertStateStore>,
    dispatcher: Dispatcher,
    state_ttl: Duration,
}

impl AlertEngine {
    pub fn new(
        evaluator: RuleEvaluator,
        watchlist: Arc<WatchlistSet>,
        states: Arc<AlertStateStore>,
        dispatcher: Dispatcher,
        state_ttl: Duration,
    ) -> Self {
        Self {
            evaluator,
            watchlist,
            states,
            dispatcher,
            state_ttl,
        }
    }

    pub fn states(&self) -> &AlertStateStore {
        &self.states
    }

    pub async fn process_batch(&self, snapshots: &[ObjectSnapshot]) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for snapshot in snapshots {
            summary.processed += 1;
            let Some(alert) = self
                .evaluator
                .evaluate(snapshot, &self.watchlist, &self.states)
                .await
            else {
                continue;
            };

            summary.alerts += 1;
            log::info!(
                "Alert: {} for {} ({})",
                alert.kind,
                snapshot.hex,
                snapshot.callsign()
            );
            if self.dispatcher.dispatch(&alert).await {
                summary.delivered += 1;
            }
        }

        summary.reaped = self.states.reap(Utc::now(), self.state_ttl);
        if summary.reaped > 0 {
            log::debug!("Alert state: reaped {} stale aircraft", summary.reaped);
        }

        summary
    }
}
