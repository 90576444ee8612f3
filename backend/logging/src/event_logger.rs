//! Relay Event Logger
//!
//! One structured entry per relay milestone (accepted, completed, failed),
//! emitted on the `relay_events` target so it can be filtered separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RelayEvent {
    Accepted {
        title: String,
        provider: String,
    },
    Completed {
        fragments: usize,
        chars: usize,
    },
    Failed {
        stage: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: RelayEvent,
}

pub struct RelayEventLogger;

impl RelayEventLogger {
    /// Builds a redacted entry for `event`.
    pub fn entry(request_id: Uuid, mut event: RelayEvent) -> EventLogEntry {
        match &mut event {
            RelayEvent::Accepted { title, .. } => {
                *title = redact_sensitive_data(title);
            }
            RelayEvent::Failed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            RelayEvent::Completed { .. } => {}
        }

        EventLogEntry {
            request_id,
            timestamp: Utc::now(),
            event,
        }
    }

    /// Logs a relay event, redacting free-text fields first.
    pub fn log_event(request_id: Uuid, event: RelayEvent) {
        let entry = Self::entry(request_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "relay_events", request_id = %entry.request_id, entry = %json, "Relay event");
    }
}
