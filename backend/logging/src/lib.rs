//! Structured logging for the incident report service.
//!
//! Handles log redaction, console and rolling NDJSON output, and relay event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, RelayEvent, RelayEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
