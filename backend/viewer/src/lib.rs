//! Client side of the incident report generator.
//!
//! Exposes the form collector, the streaming report viewer and its copy,
//! edit and PDF export actions, and the HTTP client that feeds the viewer.

pub mod client;
pub mod clipboard;
pub mod error;
pub mod form;
pub mod pdf;
pub mod session;
pub mod viewer;

pub use client::ReportClient;
pub use clipboard::{Clipboard, MemoryClipboard};
pub use error::{ClipboardError, ExportError, ViewerError};
pub use form::IncidentForm;
pub use session::ReportSession;
pub use viewer::{Flow, Mode, ReportViewer, COPY_ACK, DRAFT_MAX_CHARS};
