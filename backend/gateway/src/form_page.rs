//! Embedded browser form.
//!
//! A single static page: the five-field form, the streamed report panel and
//! its Copy / Edit / Save / Download PDF actions. It talks to
//! `/api/generate-report` and `/api/export-pdf`.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Handler for `GET /`.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
