use std::sync::Arc;

use tokio::net::TcpListener;

use incident_core::{Field, IncidentRecord};
use incident_gateway::{serve, GatewayState};
use incident_providers::ScriptedProvider;
use incident_viewer::{ReportClient, ReportSession, ReportViewer, ViewerError};

async fn spawn_gateway(provider: ScriptedProvider) -> (String, Arc<ScriptedProvider>) {
    let provider = Arc::new(provider);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = GatewayState::new(provider.clone());
    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });
    (format!("http://{addr}"), provider)
}

fn spill() -> IncidentRecord {
    IncidentRecord {
        title: "Spill".into(),
        date_time: "2024-01-01T10:00".into(),
        location: "Lab A".into(),
        persons: "J. Doe".into(),
        description: "Chemical spill reported".into(),
    }
}

#[tokio::test]
async fn submitted_form_streams_report_into_viewer() {
    let (base, provider) =
        spawn_gateway(ScriptedProvider::new(["Incident Report\n", "Title: Spill"])).await;

    let mut session = ReportSession::new(ReportClient::new(base));
    for field in Field::ALL {
        session.form.set_field(field, spill().get(field));
    }

    let mut updates = 0;
    assert!(session.submit(|_| updates += 1).await);

    assert_eq!(session.viewer.report(), "Incident Report\nTitle: Spill");
    assert_eq!(session.viewer.error(), None);
    assert_eq!(updates, 2);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_prompt.contains("Title: Spill"));
    assert!(requests[0].user_prompt.contains("Persons Involved: J. Doe"));
}

#[tokio::test]
async fn mid_stream_failure_surfaces_as_stream_error() {
    let (base, _) =
        spawn_gateway(ScriptedProvider::new(["Partial"]).fail_mid_stream("rate limited")).await;

    let mut viewer = ReportViewer::new();
    ReportClient::new(base)
        .generate(&spill(), &mut viewer, |_| {})
        .await;

    assert_eq!(viewer.report(), "");
    assert_eq!(
        viewer.error(),
        Some(&ViewerError::Stream("Streaming failed: rate limited".into()))
    );
}

#[tokio::test]
async fn missing_field_is_reported_before_streaming() {
    let (base, provider) = spawn_gateway(ScriptedProvider::new(["never"])).await;

    let mut record = spill();
    record.persons.clear();

    let mut viewer = ReportViewer::new();
    ReportClient::new(base)
        .generate(&record, &mut viewer, |_| {})
        .await;

    assert_eq!(viewer.report(), "");
    assert_eq!(
        viewer.error().map(ToString::to_string).as_deref(),
        Some("All fields are required (missing persons)")
    );
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn upstream_rejection_maps_to_generic_failure() {
    let (base, _) =
        spawn_gateway(ScriptedProvider::new(["never"]).fail_before_stream(401, "bad key")).await;

    let mut viewer = ReportViewer::new();
    ReportClient::new(base)
        .generate(&spill(), &mut viewer, |_| {})
        .await;

    assert_eq!(
        viewer.error(),
        Some(&ViewerError::Request("Failed to generate report".into()))
    );
}

#[tokio::test]
async fn exported_pdf_from_streamed_report() {
    let (base, _) = spawn_gateway(ScriptedProvider::from_text("Incident Report Title: Spill")).await;

    let mut viewer = ReportViewer::new();
    ReportClient::new(base)
        .generate(&spill(), &mut viewer, |_| {})
        .await;

    assert_eq!(viewer.report(), "Incident Report Title: Spill");
    let pdf = viewer.export_pdf().unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
