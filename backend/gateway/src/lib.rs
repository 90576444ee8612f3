//! Incident Report Gateway
//!
//! Provides the report relay endpoint, PDF export, a health probe and the
//! embedded form page.

pub mod error;
pub mod export_api;
pub mod form_page;
pub mod health_api;
pub mod relay;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, serve, start_server, GatewayState};
