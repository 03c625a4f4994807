//! HTTP client for adsb.lol feed endpoints.

use serde::Deserialize;

use super::ObjectSnapshot;
use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    ac: Vec<ObjectSnapshot>,
}

pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// `client` carries the per-request timeout configured at startup.
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch one snapshot batch, in the order the feed returned it.
    pub async fn fetch(&self) -> Result<Vec<ObjectSnapshot>, FetchError> {
        let resp = self.client.get(&self.url).send().await?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().await?;
        decode_snapshots(&body)
    }
}

/// Decode a feed body. Records without an ICAO hex are dropped.
pub fn decode_snapshots(body: &[u8]) -> Result<Vec<ObjectSnapshot>, FetchError> {
    let parsed: FeedResponse = serde_json::from_slice(body)?;
    Ok(parsed
        .ac
        .into_iter()
        .filter(|snap| !snap.hex.trim().is_empty())
        .collect())
}
