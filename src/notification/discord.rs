//! Discord webhook sink. One embed per alert.

use async_trait::async_trait;
use serde::Serialize;

use super::NotificationSink;
use crate::alerts::{AlertRecord, TriggerKind};
use crate::error::{FetchError, SinkError};

const FOOTER: &str = "ADS-B Alerter";

const YELLOW: u32 = 16_776_960;
const RED: u32 = 16_711_680;
const BLUE: u32 = 3_447_003;
const ORANGE: u32 = 16_753_920;

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub color: u32,
    pub url: String,
    pub fields: Vec<EmbedField>,
    pub footer: Footer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: &'static str,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct Footer {
    pub text: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

pub struct DiscordSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordSink {
    pub fn new(client: reqwest::Client, webhook_url: &str) -> Self {
        Self {
            client,
            webhook_url: webhook_url.to_string(),
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, alert: &AlertRecord) -> Result<(), SinkError> {
        let payload = build_payload(alert);
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(FetchError::from)?;

        if !resp.status().is_success() {
            return Err(SinkError::Delivery(FetchError::Status {
                status: resp.status().as_u16(),
            }));
        }
        Ok(())
    }
}

/// Discord rejects embed fields with empty values.
const PLACEHOLDER: &str = "N/A";

fn text(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

fn code(value: &str) -> String {
    format!("`{}`", text(value))
}

/// Render an alert as a webhook payload.
pub fn build_payload(alert: &AlertRecord) -> WebhookPayload {
    let snapshot = &alert.snapshot;
    let detail = &alert.detail;
    let altitude = snapshot.altitude.display();

    let (title, description, color) = match alert.kind {
        TriggerKind::Watchlist => (
            "Watchlist Alert".to_string(),
            alert
                .watchlist_entry
                .as_ref()
                .map(|entry| format!("**Note:** {}", entry.note))
                .unwrap_or_default(),
            YELLOW,
        ),
        TriggerKind::Emergency => (
            format!("EMERGENCY: SQUAWK {}", snapshot.squawk),
            String::new(),
            RED,
        ),
        TriggerKind::Special => (
            "Military Aircraft Detected".to_string(),
            String::new(),
            BLUE,
        ),
        TriggerKind::Proximity => (
            "LOW-FLYING: Overhead Alert".to_string(),
            match alert.distance_nm {
                Some(distance) => format!(
                    "**Aircraft is at {} ft, {:.1} nm from home**",
                    altitude, distance
                ),
                None => format!("**Aircraft is at {} ft overhead**", altitude),
            },
            ORANGE,
        ),
    };

    let fields = vec![
        EmbedField {
            name: "Callsign",
            value: code(snapshot.callsign()),
            inline: true,
        },
        EmbedField {
            name: "ICAO Hex",
            value: code(&snapshot.hex),
            inline: true,
        },
        EmbedField {
            name: "Squawk",
            value: code(&snapshot.squawk),
            inline: true,
        },
        EmbedField {
            name: "Registration",
            value: code(&detail.registration),
            inline: true,
        },
        EmbedField {
            name: "Aircraft Type",
            value: code(&detail.aircraft_type),
            inline: true,
        },
        EmbedField {
            name: "Altitude",
            value: format!("{} ft", altitude),
            inline: true,
        },
        EmbedField {
            name: "Speed",
            value: format!("{:.1} kts", snapshot.gs),
            inline: true,
        },
        EmbedField {
            name: "Owner",
            value: text(&detail.owner),
            inline: false,
        },
        EmbedField {
            name: "Airline",
            value: text(&detail.airline),
            inline: false,
        },
    ];

    let thumbnail = (!detail.thumbnail_url.is_empty()).then(|| Thumbnail {
        url: detail.thumbnail_url.clone(),
    });

    WebhookPayload {
        embeds: vec![Embed {
            title,
            description,
            color,
            url: format!("https://globe.adsb.lol/?icao={}", snapshot.hex),
            fields,
            footer: Footer { text: FOOTER },
            thumbnail,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::EnrichmentDetail;
    use crate::feed::{Altitude, ObjectSnapshot};
    use crate::watchlist::WatchlistEntry;

    fn record(kind: TriggerKind) -> AlertRecord {
        AlertRecord {
            kind,
            snapshot: ObjectSnapshot {
                hex: "a1b2c3".to_string(),
                flight: "SWA123  ".to_string(),
                squawk: "7700".to_string(),
                altitude: Altitude::Numeric(1500.0),
                gs: 212.34,
                ..Default::default()
            },
            detail: EnrichmentDetail {
                icao: "a1b2c3".to_string(),
                registration: "N8701Q".to_string(),
                aircraft_type: "B38M".to_string(),
                owner: "Southwest Airlines".to_string(),
                airline: "SWA".to_string(),
                thumbnail_url: "https://img/thumb.jpg".to_string(),
                full_image_url: String::new(),
            },
            watchlist_entry: None,
            distance_nm: None,
        }
    }

    #[test]
    fn test_emergency_embed() {
        let payload = build_payload(&record(TriggerKind::Emergency));
        let json = serde_json::to_value(&payload).unwrap();
        let embed = &json["embeds"][0];

        assert_eq!(embed["title"], "EMERGENCY: SQUAWK 7700");
        assert_eq!(embed["color"], 16711680);
        assert_eq!(embed["url"], "https://globe.adsb.lol/?icao=a1b2c3");
        assert_eq!(embed["thumbnail"]["url"], "https://img/thumb.jpg");
        assert!(embed.get("description").is_none());

        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[0]["name"], "Callsign");
        assert_eq!(fields[0]["value"], "`SWA123`");
        assert_eq!(fields[5]["value"], "1500 ft");
        assert_eq!(fields[6]["value"], "212.3 kts");
        assert_eq!(fields[8]["inline"], false);
    }

    #[test]
    fn test_watchlist_embed_carries_note() {
        let mut alert = record(TriggerKind::Watchlist);
        alert.watchlist_entry = Some(WatchlistEntry {
            icao: "A1B2C3".to_string(),
            registration: "N8701Q".to_string(),
            note: "Test airframe".to_string(),
            plane_type: "B38M".to_string(),
        });

        let embed = &build_payload(&alert).embeds[0];
        assert_eq!(embed.description, "**Note:** Test airframe");
        assert_eq!(embed.color, YELLOW);
    }

    #[test]
    fn test_unenriched_alert_has_no_empty_fields() {
        let mut alert = record(TriggerKind::Special);
        alert.detail = EnrichmentDetail::empty("ae1234");
        alert.snapshot.flight.clear();

        let embed = &build_payload(&alert).embeds[0];
        for field in &embed.fields {
            assert!(!field.value.trim().is_empty(), "{} is empty", field.name);
        }
        assert_eq!(embed.fields[0].value, "`N/A`");
        assert_eq!(embed.fields[3].value, "`N/A`");
        assert_eq!(embed.fields[7].value, "N/A");
        assert_eq!(embed.fields[8].value, "N/A");
    }

    #[test]
    fn test_proximity_embed_and_missing_thumbnail() {
        let mut alert = record(TriggerKind::Proximity);
        alert.distance_nm = Some(0.96);
        alert.detail.thumbnail_url.clear();

        let payload = build_payload(&alert);
        let embed = &payload.embeds[0];
        assert_eq!(embed.color, ORANGE);
        assert_eq!(embed.description, "**Aircraft is at 1500 ft, 1.0 nm from home**");

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["embeds"][0].get("thumbnail").is_none());
    }
}
