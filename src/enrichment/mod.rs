//! Aircraft detail enrichment (registration, type, owner, operator, photos).
//!
//! A lookaside cache in front of adsbdb. The remote answers in one of two
//! shapes which are normalized into a single [`EnrichmentDetail`] here, away
//! from any transport code.

pub mod cache;
pub mod client;
pub mod store;

use serde::{Deserialize, Serialize};

pub use cache::EnrichmentCache;
pub use client::{AdsbDbClient, DetailLookup};
pub use store::{DetailStore, NullStore, SqliteDetailStore};

/// Enrichment settings stored in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentConfig {
    #[serde(default = "default_lookup_url")]
    pub url: String,
    /// SQLite cache file. `None` disables the persistent cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
}

fn default_lookup_url() -> String {
    "https://api.adsbdb.com/v0/aircraft/".to_string()
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            url: default_lookup_url(),
            database_path: None,
        }
    }
}

/// Canonical aircraft detail. Unknown fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentDetail {
    pub icao: String,
    pub registration: String,
    pub aircraft_type: String,
    pub owner: String,
    /// Operator flag code when known, otherwise the registered owner.
    pub airline: String,
    pub thumbnail_url: String,
    pub full_image_url: String,
}

impl EnrichmentDetail {
    pub fn empty(icao: &str) -> Self {
        Self {
            icao: icao.to_string(),
            ..Default::default()
        }
    }
}

/// Raw lookup response. Carries both the nested "commercial" shape under
/// `response.aircraft` and the flat "reference" shape at the top level; a
/// given response usually populates only one of them.
#[derive(Debug, Default, Deserialize)]
pub struct DetailPayload {
    #[serde(default)]
    response: Option<ResponseBody>,
    #[serde(default)]
    registration: Option<String>,
    #[serde(default, rename = "type")]
    aircraft_type: Option<String>,
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Aircraft { aircraft: NestedAircraft },
    // e.g. `"response": "unknown aircraft"`
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
struct NestedAircraft {
    #[serde(default)]
    registration: Option<String>,
    #[serde(default, rename = "type")]
    aircraft_type: Option<String>,
    #[serde(default, rename = "registered_owner")]
    owner: Option<String>,
    #[serde(default, rename = "registered_owner_operator_flag_code")]
    operator_flag: Option<String>,
    #[serde(default, rename = "url_photo_thumbnail")]
    thumbnail_url: Option<String>,
    #[serde(default, rename = "url_photo")]
    full_image_url: Option<String>,
}

fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

impl DetailPayload {
    fn nested(&self) -> Option<&NestedAircraft> {
        match &self.response {
            Some(ResponseBody::Aircraft { aircraft }) => Some(aircraft),
            Some(ResponseBody::Other(_)) | None => None,
        }
    }
}

/// Collapse either payload shape into one record.
///
/// The nested shape wins whenever its registration is non-empty; otherwise
/// the flat fields are used. A payload with neither yields an all-empty
/// record for `icao`.
pub fn normalize(icao: &str, payload: &DetailPayload) -> EnrichmentDetail {
    if let Some(aircraft) = payload
        .nested()
        .filter(|aircraft| !text(&aircraft.registration).is_empty())
    {
        let owner = text(&aircraft.owner);
        let flag = text(&aircraft.operator_flag);
        return EnrichmentDetail {
            icao: icao.to_string(),
            registration: text(&aircraft.registration),
            aircraft_type: text(&aircraft.aircraft_type),
            airline: if flag.is_empty() { owner.clone() } else { flag },
            owner,
            thumbnail_url: text(&aircraft.thumbnail_url),
            full_image_url: text(&aircraft.full_image_url),
        };
    }

    let owner = text(&payload.owner);
    EnrichmentDetail {
        icao: icao.to_string(),
        registration: text(&payload.registration),
        aircraft_type: text(&payload.aircraft_type),
        airline: owner.clone(),
        owner,
        thumbnail_url: String::new(),
        full_image_url: String::new(),
    }
}
