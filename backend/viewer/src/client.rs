//! Relay client
//!
//! Posts an incident to the gateway and feeds the SSE response body into a
//! [`ReportViewer`] as it arrives.

use incident_core::IncidentRecord;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ViewerError;
use crate::viewer::ReportViewer;

pub const GENERATE_PATH: &str = "/api/generate-report";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportClient {
    http: Client,
    base_url: String,
}

impl ReportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATE_PATH)
    }

    /// Sends the record and returns the streaming response.
    ///
    /// A non-success status is turned into the relay's `error` message, or
    /// `"API request failed: <status>"` when the body carries none.
    pub async fn open(&self, record: &IncidentRecord) -> Result<Response, ViewerError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(record)
            .send()
            .await
            .map_err(|e| ViewerError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
        warn!(status = status.as_u16(), message = %message, "relay refused report request");
        Err(ViewerError::Request(message))
    }

    /// Runs one full request and renders the result into `viewer`.
    pub async fn generate(
        &self,
        record: &IncidentRecord,
        viewer: &mut ReportViewer,
        on_update: impl FnMut(&str),
    ) {
        info!(title = %record.title, "requesting report");
        match self.open(record).await {
            Ok(response) => viewer.render(response.bytes_stream(), on_update).await,
            Err(ViewerError::Request(message)) => viewer.fail_request(message),
            Err(other) => {
                viewer.reset();
                viewer.fail(other);
            }
        }
    }
}
