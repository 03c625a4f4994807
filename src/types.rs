use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enrichment::EnrichmentConfig;
use crate::error::ConfigError;
use crate::feed::FeedConfig;
use crate::geo::{HomeConfig, ProximityConfig};
use crate::notification::NotificationConfig;
use crate::watchlist::WatchlistConfig;

/// Radius of the default adsb.lol point query, in nautical miles.
pub const DEFAULT_FEED_RADIUS_NM: u32 = 50;

/// Configuration stored in ~/.adsb-alerter/config.json
///
/// Every field has a default, so an absent or empty file runs the primary
/// point query around the default home. A webhook (or `logAlerts`) must
/// still be configured to pass validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub home: HomeConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
    /// Feed sources. Omitted means a single point query around `home`; an
    /// explicit empty list is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeds: Option<Vec<FeedConfig>>,
    #[serde(default)]
    pub watchlist: WatchlistConfig,
    /// Forget an aircraft's alert state after this long unseen.
    #[serde(default = "default_state_ttl_minutes")]
    pub state_ttl_minutes: u64,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Deadline for every outbound HTTP request.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_state_ttl_minutes() -> u64 {
    30
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: HomeConfig::default(),
            proximity: ProximityConfig::default(),
            feeds: None,
            watchlist: WatchlistConfig::default(),
            state_ttl_minutes: default_state_ttl_minutes(),
            enrichment: EnrichmentConfig::default(),
            notifications: NotificationConfig::default(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Config {
    /// Configured feeds, or the primary point query around home.
    pub fn feeds(&self) -> Vec<FeedConfig> {
        match &self.feeds {
            Some(feeds) => feeds.clone(),
            None => vec![FeedConfig::point_query(
                "primary",
                self.home.lat,
                self.home.lon,
                DEFAULT_FEED_RADIUS_NM,
            )],
        }
    }

    pub fn state_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.state_ttl_minutes as i64)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feeds = self.feeds();
        if feeds.is_empty() {
            return Err(ConfigError::Missing("feeds"));
        }
        for feed in &feeds {
            if feed.url.trim().is_empty() {
                return invalid("feeds.url", format!("feed '{}' has no URL", feed.name));
            }
            url::Url::parse(&feed.url).map_err(|e| ConfigError::Invalid {
                field: "feeds.url",
                reason: format!("feed '{}': {}", feed.name, e),
            })?;
            if feed.interval_secs == 0 {
                return invalid(
                    "feeds.intervalSecs",
                    format!("feed '{}' must poll at least every second", feed.name),
                );
            }
        }

        if self.home.lat.abs() > 90.0 || self.home.lon.abs() > 180.0 {
            return invalid(
                "home",
                format!("({}, {}) is not a valid position", self.home.lat, self.home.lon),
            );
        }
        if self.proximity.radius_nm <= 0.0 {
            return invalid("proximity.radiusNm", "must be positive".to_string());
        }
        if self.proximity.ceiling_ft <= 0.0 {
            return invalid("proximity.ceilingFt", "must be positive".to_string());
        }
        if self.watchlist.refresh_hours == 0 {
            return invalid("watchlist.refreshHours", "must be positive".to_string());
        }
        if self.state_ttl_minutes == 0 {
            return invalid("stateTtlMinutes", "must be positive".to_string());
        }
        if self.http_timeout_secs == 0 {
            return invalid("httpTimeoutSecs", "must be positive".to_string());
        }
        if !self.notifications.has_destination() {
            return Err(ConfigError::Missing(
                "notifications (set DISCORD_WEBHOOK_URL, discordWebhookUrl, routes, or logAlerts)",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid { field, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::TriggerKind;

    fn with_log_alerts(mut config: Config) -> Config {
        config.notifications.log_alerts = true;
        config
    }

    #[test]
    fn test_empty_json_gets_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.state_ttl_minutes, 30);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.proximity.radius_nm, 5.0);
        assert_eq!(config.proximity.ceiling_ft, 2000.0);
        assert_eq!(config.watchlist.refresh_hours, 24);

        let feeds = config.feeds();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].name, "primary");
        assert_eq!(
            feeds[0].url,
            "https://api.adsb.lol/v2/point/35.740971/-78.498878/50"
        );
        assert_eq!(feeds[0].interval_secs, 60);
    }

    #[test]
    fn test_full_config_parses() {
        let config: Config = serde_json::from_str(
            r#"{
                "home": {"lat": 51.47, "lon": -0.4543},
                "proximity": {"radiusNm": 3.0, "ceilingFt": 1500},
                "feeds": [
                    {"name": "primary", "url": "https://api.adsb.lol/v2/point/51.47/-0.45/40"},
                    {"name": "mil", "url": "https://api.adsb.lol/v2/mil", "intervalSecs": 120}
                ],
                "watchlist": {"refreshHours": 12},
                "stateTtlMinutes": 15,
                "enrichment": {"databasePath": "/tmp/cache.db"},
                "notifications": {
                    "discordWebhookUrl": "https://discord.test/hook",
                    "routes": {"proximity": "https://discord.test/overhead"}
                },
                "httpTimeoutSecs": 5
            }"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        let feeds = config.feeds();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].interval_secs, 60);
        assert_eq!(feeds[1].interval_secs, 120);
        assert_eq!(config.state_ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.notifications.routes.get(&TriggerKind::Proximity).map(String::as_str),
            Some("https://discord.test/overhead")
        );
        assert_eq!(config.enrichment.database_path.as_deref(), Some("/tmp/cache.db"));
    }

    #[test]
    fn test_validate_requires_notification_destination() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
        assert!(with_log_alerts(Config::default()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_explicit_empty_feeds() {
        let config = with_log_alerts(Config {
            feeds: Some(Vec::new()),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::Missing("feeds"))));
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let mut config = with_log_alerts(Config::default());
        config.proximity.radius_nm = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "proximity.radiusNm", .. })
        ));

        let mut config = with_log_alerts(Config::default());
        config.feeds = Some(vec![FeedConfig {
            name: "bad".to_string(),
            url: "not a url".to_string(),
            interval_secs: 60,
        }]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "feeds.url", .. })
        ));

        let mut config = with_log_alerts(Config::default());
        config.state_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }
}
