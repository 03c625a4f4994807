//! Alert notification sinks and the dispatcher that routes to them.
//!
//! Delivery is best-effort: a failed send is logged and the alert is gone.
//! Routing is by trigger kind, with an optional default sink for kinds that
//! have no route of their own.

pub mod discord;
pub mod log_sink;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertRecord, TriggerKind};
use crate::error::SinkError;

pub use discord::DiscordSink;
pub use log_sink::LogSink;

/// Somewhere an alert can be delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short label for log lines.
    fn name(&self) -> &str;

    async fn deliver(&self, alert: &AlertRecord) -> Result<(), SinkError>;
}

/// Notification settings stored in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    /// Default Discord webhook for every alert kind without its own route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_webhook_url: Option<String>,
    /// Per-kind webhook overrides, e.g. `{"emergency": "https://..."}`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub routes: HashMap<TriggerKind, String>,
    /// Fall back to writing alerts to the log when no webhook is set.
    #[serde(default)]
    pub log_alerts: bool,
}

impl NotificationConfig {
    pub fn has_destination(&self) -> bool {
        self.discord_webhook_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
            || !self.routes.is_empty()
            || self.log_alerts
    }
}

#[derive(Default)]
pub struct Dispatcher {
    default: Option<Arc<dyn NotificationSink>>,
    routes: HashMap<TriggerKind, Arc<dyn NotificationSink>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the routing table from config. Routed kinds each get their own
    /// webhook sink; everything else goes to the default webhook, or to the
    /// log when `logAlerts` is set and no default webhook is configured.
    pub fn from_config(config: &NotificationConfig, http: reqwest::Client) -> Self {
        let mut dispatcher = Self::new();

        match config.discord_webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                dispatcher = dispatcher.with_default(Arc::new(DiscordSink::new(http.clone(), url)));
            }
            _ if config.log_alerts => {
                dispatcher = dispatcher.with_default(Arc::new(LogSink));
            }
            _ => {}
        }

        for (kind, url) in &config.routes {
            dispatcher = dispatcher.with_route(*kind, Arc::new(DiscordSink::new(http.clone(), url)));
        }

        dispatcher
    }

    pub fn with_default(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.default = Some(sink);
        self
    }

    pub fn with_route(mut self, kind: TriggerKind, sink: Arc<dyn NotificationSink>) -> Self {
        self.routes.insert(kind, sink);
        self
    }

    /// Sink responsible for `kind`, if any.
    pub fn sink_for(&self, kind: TriggerKind) -> Option<&Arc<dyn NotificationSink>> {
        self.routes.get(&kind).or(self.default.as_ref())
    }

    /// Deliver one alert. Returns true if a sink accepted it.
    pub async fn dispatch(&self, alert: &AlertRecord) -> bool {
        let Some(sink) = self.sink_for(alert.kind) else {
            log::warn!(
                "Notifications: no sink for {} alert on {}, dropping",
                alert.kind,
                alert.snapshot.hex
            );
            return false;
        };

        match sink.deliver(alert).await {
            Ok(()) => {
                log::info!(
                    "Notifications: sent {} alert for {} via {}",
                    alert.kind,
                    alert.snapshot.hex,
                    sink.name()
                );
                true
            }
            Err(e) => {
                log::warn!(
                    "Notifications: {} failed for {} alert on {}: {}",
                    sink.name(),
                    alert.kind,
                    alert.snapshot.hex,
                    e
                );
                false
            }
        }
    }
}
