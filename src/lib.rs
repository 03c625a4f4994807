pub mod alerts;
pub mod enrichment;
pub mod error;
pub mod feed;
pub mod geo;
pub mod notification;
pub mod state;
pub mod types;
pub mod watchlist;

use std::sync::Arc;

use state::AppState;
use types::Config;

/// Start the watchlist refresher and one poller per feed, then run until
/// interrupted.
pub async fn run(config: Config) -> Result<(), error::ConfigError> {
    let feeds = config.feeds();
    let state = Arc::new(AppState::new(config)?);

    log::info!(
        "adsb-alerter {} starting: {} feed(s), home ({:.4}, {:.4}), proximity {} nm below {} ft",
        env!("CARGO_PKG_VERSION"),
        feeds.len(),
        state.config.home.lat,
        state.config.home.lon,
        state.config.proximity.radius_nm,
        state.config.proximity.ceiling_ft
    );

    let mut tasks = Vec::with_capacity(feeds.len() + 1);

    // Spawn watchlist refresher (loads immediately, then every refreshHours)
    let refresher_state = state.clone();
    tasks.push(tokio::spawn(async move {
        watchlist::refresher::run_watchlist_refresher(refresher_state).await;
    }));

    // Spawn one poller per feed
    for feed in feeds {
        let poller_state = state.clone();
        tasks.push(tokio::spawn(async move {
            feed::poller::run_feed_poller(poller_state, feed).await;
        }));
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown requested, stopping pollers"),
        Err(e) => log::error!("Failed to listen for shutdown signal: {}", e),
    }

    for task in tasks {
        task.abort();
    }
    Ok(())
}
