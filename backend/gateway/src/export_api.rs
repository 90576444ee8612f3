//! PDF Export Endpoint (`POST /api/export-pdf`).
//!
//! Renders the text the browser page is displaying into the same A4
//! document the terminal client writes.

use axum::{
    extract::rejection::JsonRejection,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use incident_viewer::pdf::{render_pdf, DEFAULT_FILE_NAME};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub text: String,
}

/// Handler for `POST /api/export-pdf`.
pub async fn export_pdf(
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No report content to export".into()));
    }

    let bytes = render_pdf(&request.text).map_err(|e| {
        warn!(error = %e, "PDF export failed");
        ApiError::Export
    })?;
    info!(bytes = bytes.len(), "Exported report pdf");

    let disposition = format!("attachment; filename=\"{DEFAULT_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
