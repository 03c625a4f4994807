//! Background feed poller. One task per configured feed.
//!
//! Polls once immediately, then every `intervalSecs`. A slow cycle delays the
//! next one rather than overlapping it. Fetch failures skip the cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::client::FeedClient;
use super::FeedConfig;
use crate::alerts::{AlertEngine, CycleSummary};
use crate::error::FetchError;
use crate::state::AppState;

/// Fetch one batch and run it through the engine.
pub async fn poll_once(
    client: &FeedClient,
    engine: &AlertEngine,
) -> Result<CycleSummary, FetchError> {
    let snapshots = client.fetch().await?;
    Ok(engine.process_batch(&snapshots).await)
}

pub async fn run_feed_poller(state: Arc<AppState>, feed: FeedConfig) {
    let client = FeedClient::new(state.http.clone(), &feed.url);
    let period = Duration::from_secs(feed.interval_secs.max(1));

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log::info!(
        "Feed poller [{}]: polling {} every {}s",
        feed.name,
        client.url(),
        period.as_secs()
    );

    loop {
        ticker.tick().await;

        match poll_once(&client, &state.engine).await {
            Ok(summary) => log::info!(
                "Feed poller [{}]: {} aircraft, {} alerts, {} tracked, {} reaped",
                feed.name,
                summary.processed,
                summary.alerts,
                state.engine.states().len(),
                summary.reaped
            ),
            Err(e) if e.is_transient() => {
                log::warn!("Feed poller [{}]: fetch failed, will retry: {}", feed.name, e)
            }
            Err(e) => log::warn!("Feed poller [{}]: fetch failed: {}", feed.name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertStateStore, RuleEvaluator};
    use crate::enrichment::{AdsbDbClient, EnrichmentCache, NullStore};
    use crate::geo::{Geofence, HomeConfig, ProximityConfig};
    use crate::notification::Dispatcher;
    use crate::watchlist::WatchlistSet;
    use chrono::Utc;

    fn engine(http: reqwest::Client) -> AlertEngine {
        let enrichment = Arc::new(EnrichmentCache::new(
            Arc::new(AdsbDbClient::new(http, "http://127.0.0.1:9/")),
            Arc::new(NullStore),
        ));
        AlertEngine::new(
            RuleEvaluator::new(
                Geofence::new(HomeConfig::default(), ProximityConfig::default()),
                enrichment,
            ),
            Arc::new(WatchlistSet::new()),
            Arc::new(AlertStateStore::new()),
            Dispatcher::new(),
            chrono::Duration::minutes(30),
        )
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_cycle_without_reaping() {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let engine = engine(http.clone());
        engine
            .states()
            .with_state("stale1", Utc::now() - chrono::Duration::hours(2), |s| {
                s.special.fire();
            });

        // Nothing listens on the discard port, so the request is refused.
        let client = FeedClient::new(http, "http://127.0.0.1:9/v2/mil");
        let result = poll_once(&client, &engine).await;

        assert!(result.is_err());
        assert_eq!(engine.states().len(), 1);
        assert!(engine.states().get("stale1").unwrap().special.is_alerted());
    }
}
