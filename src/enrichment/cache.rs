//! Lookaside enrichment cache.
//!
//! Store hit returns immediately. On a miss the remote lookup runs once per
//! identifier no matter how many pollers ask concurrently; the first caller
//! drives the request and everyone else awaits the same cell.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use super::{normalize, DetailLookup, DetailStore, EnrichmentDetail};

type InFlight = Arc<OnceCell<EnrichmentDetail>>;

pub struct EnrichmentCache {
    lookup: Arc<dyn DetailLookup>,
    store: Arc<dyn DetailStore>,
    in_flight: DashMap<String, InFlight>,
}

impl EnrichmentCache {
    pub fn new(lookup: Arc<dyn DetailLookup>, store: Arc<dyn DetailStore>) -> Self {
        Self {
            lookup,
            store,
            in_flight: DashMap::new(),
        }
    }

    /// Resolve details for `icao`. Never fails: any error degrades to an
    /// empty record, which is not cached.
    pub async fn lookup(&self, icao: &str) -> EnrichmentDetail {
        let key = icao.trim().to_lowercase();

        match self.store.get(&key) {
            Ok(Some(detail)) => {
                log::debug!("Enrichment: cache hit for {}", key);
                return detail;
            }
            Ok(None) => {}
            Err(e) => log::warn!("Enrichment: cache read failed for {}: {}", key, e),
        }

        // Clone the cell out so the shard lock is released before awaiting.
        let cell: InFlight = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let detail = cell
            .get_or_init(|| self.fetch_and_store(&key))
            .await
            .clone();

        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));

        detail
    }

    async fn fetch_and_store(&self, key: &str) -> EnrichmentDetail {
        log::debug!("Enrichment: cache miss for {}, querying remote", key);

        let payload = match self.lookup.fetch_detail(key).await {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Enrichment: lookup failed for {}: {}", key, e);
                return EnrichmentDetail::empty(key);
            }
        };

        let detail = normalize(key, &payload);
        if let Err(e) = self.store.upsert(key, &detail) {
            log::warn!("Enrichment: failed to cache {}: {}", key, e);
        }
        detail
    }
}
