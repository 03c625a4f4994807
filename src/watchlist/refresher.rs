//! Background watchlist refresher.
//!
//! Loads the CSV once immediately at startup, then every `refresh_hours`.
//! A failed fetch keeps the previous set.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::FetchError;
use crate::state::AppState;

/// Download the watchlist CSV body.
pub async fn fetch_watchlist(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            status: resp.status().as_u16(),
        });
    }
    Ok(resp.text().await?)
}

pub async fn run_watchlist_refresher(state: Arc<AppState>) {
    let config = state.config.watchlist.clone();
    let period = Duration::from_secs(config.refresh_hours.max(1) * 3600);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        log::info!("Watchlist: refreshing from {}", config.url);

        match fetch_watchlist(&state.http, &config.url).await {
            Ok(body) => {
                let count = state.watchlist.refresh(&body);
                log::info!("Watchlist: loaded {} aircraft", count);
            }
            Err(e) => {
                log::warn!(
                    "Watchlist: refresh failed, keeping {} existing entries: {}",
                    state.watchlist.len(),
                    e
                );
            }
        }
    }
}
