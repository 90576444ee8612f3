//! Report Relay Endpoint (`POST /api/generate-report`).
//!
//! Validates the incident, opens one upstream completion stream and re-emits
//! every delta as an SSE frame, ending with `[DONE]` or a single error frame.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use tracing::{info, warn};
use uuid::Uuid;

use incident_core::{
    CompletionRequest, CoreError, DeltaStream, IncidentSubmission, ProviderError, StreamFragment,
};
use incident_logging::{redact_sensitive_data, RelayEvent, RelayEventLogger};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Handler for `POST /api/generate-report`.
pub async fn generate_report(
    State(state): State<GatewayState>,
    payload: Result<Json<IncidentSubmission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();

    let Json(submission) = payload.map_err(|rejection| {
        warn!(request_id = %request_id, error = %rejection, "Rejected report request body");
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let record = submission.into_record().map_err(|e| {
        let CoreError::MissingField(field) = &e;
        warn!(request_id = %request_id, field = %field, "Report request missing field");
        ApiError::BadRequest(format!("All fields are required (missing {field})"))
    })?;

    RelayEventLogger::log_event(
        request_id,
        RelayEvent::Accepted {
            title: record.title.clone(),
            provider: state.provider.name().to_string(),
        },
    );

    let request = CompletionRequest::for_incident(&record);
    let upstream = state
        .provider
        .stream_completion(&request)
        .await
        .map_err(|e| {
            RelayEventLogger::log_event(
                request_id,
                RelayEvent::Failed {
                    stage: "pre-flight".into(),
                    error_msg: e.to_string(),
                },
            );
            ApiError::Upstream
        })?;

    info!(request_id = %request_id, "Streaming report");

    let sse = Sse::new(relay_events(upstream, request_id)).keep_alive(KeepAlive::default());
    Ok(([(header::CONNECTION, "keep-alive")], sse).into_response())
}

enum RelayState {
    Streaming {
        upstream: DeltaStream,
        fragments: usize,
        chars: usize,
    },
    Finished,
}

fn frame(fragment: StreamFragment) -> Result<Event, Infallible> {
    Ok(Event::default().data(fragment.to_data()))
}

/// Client-facing text for a mid-stream failure.
fn stream_failure_message(error: &ProviderError) -> String {
    match error {
        ProviderError::Stream(detail) => {
            format!("Streaming failed: {}", redact_sensitive_data(detail))
        }
        _ => "Streaming failed".to_string(),
    }
}

/// Maps upstream deltas to relay frames.
///
/// Empty deltas are skipped. The stream ends after `[DONE]` or after the one
/// error frame; frames already sent are never retracted.
pub fn relay_events(
    upstream: DeltaStream,
    request_id: Uuid,
) -> impl Stream<Item = Result<Event, Infallible>> + Send {
    let initial = RelayState::Streaming {
        upstream,
        fragments: 0,
        chars: 0,
    };

    stream::unfold(initial, move |state| async move {
        let RelayState::Streaming {
            mut upstream,
            mut fragments,
            mut chars,
        } = state
        else {
            return None;
        };

        loop {
            match upstream.next().await {
                Some(Ok(delta)) if delta.is_empty() => continue,
                Some(Ok(delta)) => {
                    fragments += 1;
                    chars += delta.chars().count();
                    let next = RelayState::Streaming {
                        upstream,
                        fragments,
                        chars,
                    };
                    return Some((frame(StreamFragment::Delta(delta)), next));
                }
                Some(Err(e)) => {
                    RelayEventLogger::log_event(
                        request_id,
                        RelayEvent::Failed {
                            stage: "stream".into(),
                            error_msg: e.to_string(),
                        },
                    );
                    let message = stream_failure_message(&e);
                    return Some((frame(StreamFragment::Error(message)), RelayState::Finished));
                }
                None => {
                    RelayEventLogger::log_event(
                        request_id,
                        RelayEvent::Completed { fragments, chars },
                    );
                    return Some((frame(StreamFragment::Done), RelayState::Finished));
                }
            }
        }
    })
}
