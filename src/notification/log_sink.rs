//! Sink that writes alerts to the log, for runs without a webhook.

use async_trait::async_trait;

use super::NotificationSink;
use crate::alerts::AlertRecord;
use crate::error::SinkError;

#[derive(Debug, Default)]
pub struct LogSink;

/// One-line summary of an alert.
pub fn summarize(alert: &AlertRecord) -> String {
    let snapshot = &alert.snapshot;
    let mut line = format!(
        "{} alert: {} callsign={} squawk={} alt={} reg={} type={}",
        alert.kind.as_str().to_uppercase(),
        snapshot.hex,
        snapshot.callsign(),
        snapshot.squawk,
        snapshot.altitude.display(),
        alert.detail.registration,
        alert.detail.aircraft_type,
    );
    if let Some(entry) = &alert.watchlist_entry {
        line.push_str(&format!(" note=\"{}\"", entry.note));
    }
    if let Some(distance) = alert.distance_nm {
        line.push_str(&format!(" distance={:.1}nm", distance));
    }
    line
}

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, alert: &AlertRecord) -> Result<(), SinkError> {
        log::info!("{}", summarize(alert));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::TriggerKind;
    use crate::enrichment::EnrichmentDetail;
    use crate::feed::{Altitude, ObjectSnapshot};

    #[test]
    fn test_summarize_proximity() {
        let alert = AlertRecord {
            kind: TriggerKind::Proximity,
            snapshot: ObjectSnapshot {
                hex: "a1b2c3".to_string(),
                flight: "N123  ".to_string(),
                squawk: "1200".to_string(),
                altitude: Altitude::Ground,
                ..Default::default()
            },
            detail: EnrichmentDetail::empty("a1b2c3"),
            watchlist_entry: None,
            distance_nm: Some(2.345),
        };

        assert_eq!(
            summarize(&alert),
            "PROXIMITY alert: a1b2c3 callsign=N123 squawk=1200 alt=ground reg= type= distance=2.3nm"
        );
    }
}
