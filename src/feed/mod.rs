//! ADS-B positional feed: snapshot model, HTTP client and per-feed poller.
//!
//! The feed is adsb.lol's v2 API. Every endpoint returns `{ "ac": [...] }`
//! with the same record shape, so a point query and the military endpoint
//! share one decoder.

pub mod client;
pub mod poller;

use serde::{Deserialize, Deserializer, Serialize};

/// Squawk codes reserved for hijack, radio failure and general emergency.
pub const EMERGENCY_SQUAWKS: [&str; 3] = ["7500", "7600", "7700"];

/// One configured feed source. Each runs on its own poller task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl FeedConfig {
    /// adsb.lol point query centred on the given coordinates.
    pub fn point_query(name: &str, lat: f64, lon: f64, radius_nm: u32) -> Self {
        Self {
            name: name.to_string(),
            url: format!("https://api.adsb.lol/v2/point/{lat:.6}/{lon:.6}/{radius_nm}"),
            interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Barometric altitude as reported by the feed.
///
/// adsb.lol sends a number of feet for airborne targets and the string
/// `"ground"` for surface targets; anything else (missing, null, garbage)
/// is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Altitude {
    Numeric(f64),
    Ground,
    #[default]
    Unknown,
}

impl Altitude {
    /// Text used in notification fields.
    pub fn display(&self) -> String {
        match self {
            Altitude::Numeric(feet) => format!("{feet:.0}"),
            Altitude::Ground => "ground".to_string(),
            Altitude::Unknown => "N/A".to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Altitude {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(serde::de::IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(feet) => Altitude::Numeric(feet),
            Raw::Text(text) if text.trim().eq_ignore_ascii_case("ground") => Altitude::Ground,
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Altitude::Numeric)
                .unwrap_or(Altitude::Unknown),
            Raw::Other(_) => Altitude::Unknown,
        })
    }
}

/// Nested "last known position" used when the live position is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct LastPosition {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
}

/// One poll's report for one aircraft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectSnapshot {
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub flight: String,
    #[serde(default, rename = "r")]
    pub registration: String,
    #[serde(default)]
    pub squawk: String,
    #[serde(default)]
    pub mil: bool,
    /// adsb.lol database flags; bit 0 marks military airframes.
    #[serde(default, rename = "dbFlags")]
    pub db_flags: u32,
    #[serde(default, rename = "alt_baro")]
    pub altitude: Altitude,
    #[serde(default)]
    pub gs: f64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, rename = "lastPosition")]
    pub last_position: Option<LastPosition>,
    #[serde(default, rename = "t")]
    pub type_code: Option<String>,
}

impl ObjectSnapshot {
    /// Callsign without the trailing padding the feed adds.
    pub fn callsign(&self) -> &str {
        self.flight.trim()
    }

    /// Special-category (military) flag from either encoding.
    pub fn is_special(&self) -> bool {
        self.mil || self.db_flags & 1 == 1
    }

    pub fn is_emergency(&self) -> bool {
        EMERGENCY_SQUAWKS.contains(&self.squawk.as_str())
    }
}
