//! Remote detail lookup against adsbdb.
//!
//! `GET {base}{ICAO}`; any non-2xx answer (adsbdb uses 404 for unknown
//! airframes) is an error and the caller degrades to an empty detail.

use async_trait::async_trait;

use super::DetailPayload;
use crate::error::FetchError;

/// Source of raw aircraft detail payloads.
#[async_trait]
pub trait DetailLookup: Send + Sync {
    async fn fetch_detail(&self, icao: &str) -> Result<DetailPayload, FetchError>;
}

pub struct AdsbDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdsbDbClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub fn detail_url(&self, icao: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, icao)
        } else {
            format!("{}/{}", self.base_url, icao)
        }
    }
}

#[async_trait]
impl DetailLookup for AdsbDbClient {
    async fn fetch_detail(&self, icao: &str) -> Result<DetailPayload, FetchError> {
        let resp = self.client.get(self.detail_url(icao)).send().await?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_url_joins_base() {
        let with_slash = AdsbDbClient::new(
            reqwest::Client::new(),
            "https://api.adsbdb.com/v0/aircraft/",
        );
        assert_eq!(
            with_slash.detail_url("A1B2C3"),
            "https://api.adsbdb.com/v0/aircraft/A1B2C3"
        );

        let without = AdsbDbClient::new(reqwest::Client::new(), "http://localhost:8080/aircraft");
        assert_eq!(
            without.detail_url("a1b2c3"),
            "http://localhost:8080/aircraft/a1b2c3"
        );
    }
}
