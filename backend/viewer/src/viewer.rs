//! Report Viewer
//!
//! Accumulates streamed deltas into the report text and owns the copy,
//! edit and PDF export actions over it.

use std::fmt::Display;
use std::path::Path;
use std::pin::pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use incident_core::{SseDecoder, SseFrame, StreamFragment};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::error::{ClipboardError, ExportError, ViewerError};
use crate::pdf;

/// How long the copy button reads "Copied!".
pub const COPY_ACK: Duration = Duration::from_secs(2);

/// Longest draft the editor accepts, in characters.
pub const DRAFT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Viewing,
    Editing {
        draft: String,
    },
}

/// Whether stream consumption should go on after a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Default)]
pub struct ReportViewer {
    report: String,
    error: Option<ViewerError>,
    mode: Mode,
    copied_at: Option<Instant>,
}

impl ReportViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn error(&self) -> Option<&ViewerError> {
        self.error.as_ref()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Clears everything a previous render left behind.
    pub fn reset(&mut self) {
        self.report.clear();
        self.error = None;
        self.mode = Mode::Viewing;
        self.copied_at = None;
    }

    /// Applies one decoded fragment.
    pub fn apply(&mut self, fragment: StreamFragment) -> Flow {
        match fragment {
            StreamFragment::Delta(text) => {
                self.report.push_str(&text);
                Flow::Continue
            }
            StreamFragment::Done => Flow::Stop,
            StreamFragment::Error(message) => {
                self.fail(ViewerError::Stream(message));
                Flow::Stop
            }
        }
    }

    /// Shows `error` in place of the report.
    pub fn fail(&mut self, error: ViewerError) {
        warn!(error = %error, "report stream aborted");
        self.report.clear();
        self.error = Some(error);
    }

    /// Records a relay refusal that arrived before any stream.
    pub fn fail_request(&mut self, message: impl Into<String>) {
        self.reset();
        self.fail(ViewerError::Request(message.into()));
    }

    /// Marks the end of consumption.
    pub fn finish(&mut self) {
        if self.report.is_empty() && self.error.is_none() {
            self.error = Some(ViewerError::NoContent);
        }
    }

    /// Consumes a relay response body and renders it as it arrives.
    ///
    /// `on_update` receives the full report text after every delta that
    /// added to it.
    pub async fn render<S, B, E>(&mut self, body: S, mut on_update: impl FnMut(&str))
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        self.reset();
        let mut decoder = SseDecoder::new();
        let mut body = pin!(body);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.fail(ViewerError::Transport(e.to_string()));
                    return;
                }
            };
            for frame in decoder.push(chunk.as_ref()) {
                if self.handle_frame(&frame, &mut on_update) == Flow::Stop {
                    self.finish();
                    return;
                }
            }
        }

        if let Some(frame) = decoder.finish() {
            self.handle_frame(&frame, &mut on_update);
        }
        self.finish();
    }

    fn handle_frame(&mut self, frame: &SseFrame, on_update: &mut impl FnMut(&str)) -> Flow {
        if frame.data.is_empty() {
            return Flow::Continue;
        }
        let fragment = match StreamFragment::parse(&frame.data) {
            Ok(fragment) => fragment,
            Err(e) => {
                debug!(error = %e, data = %frame.data, "undecodable frame");
                self.fail(ViewerError::Parse);
                return Flow::Stop;
            }
        };

        let grows = matches!(&fragment, StreamFragment::Delta(text) if !text.is_empty());
        let flow = self.apply(fragment);
        if grows {
            on_update(&self.report);
        }
        flow
    }

    /// Text currently on screen: the draft while editing, else the report.
    pub fn displayed_text(&self) -> &str {
        match &self.mode {
            Mode::Editing { draft } => draft,
            Mode::Viewing => &self.report,
        }
    }

    pub fn copy(&mut self, clipboard: &mut dyn Clipboard) -> Result<(), ClipboardError> {
        clipboard.write_text(self.displayed_text())?;
        self.copied_at = Some(Instant::now());
        Ok(())
    }

    pub fn is_copied(&self) -> bool {
        self.copied_at.is_some_and(|at| at.elapsed() < COPY_ACK)
    }

    pub fn copy_label(&self) -> &'static str {
        if self.is_copied() {
            "Copied!"
        } else {
            "Copy"
        }
    }

    /// Enters edit mode with a draft of the current report.
    ///
    /// Returns `false` when there is nothing to edit.
    pub fn edit(&mut self) -> bool {
        if self.report.is_empty() {
            return false;
        }
        if matches!(self.mode, Mode::Viewing) {
            self.mode = Mode::Editing {
                draft: self.report.clone(),
            };
        }
        true
    }

    /// Replaces the draft. Input beyond [`DRAFT_MAX_CHARS`] is dropped.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Mode::Editing { draft } = &mut self.mode {
            let mut text = text.into();
            if let Some((cut, _)) = text.char_indices().nth(DRAFT_MAX_CHARS) {
                text.truncate(cut);
            }
            *draft = text;
        }
    }

    /// Commits `text` as the report and leaves edit mode.
    pub fn save(&mut self, text: impl Into<String>) {
        self.report = text.into();
        self.mode = Mode::Viewing;
        self.error = None;
    }

    pub fn export_pdf(&self) -> Result<Vec<u8>, ExportError> {
        pdf::render_pdf(self.displayed_text())
    }

    pub fn save_pdf(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let bytes = self.export_pdf()?;
        std::fs::write(path.as_ref(), bytes)?;
        debug!(path = %path.as_ref().display(), "report exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use futures::stream;

    fn body(chunks: Vec<&'static str>) -> impl Stream<Item = Result<&'static str, std::io::Error>> {
        stream::iter(chunks.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn renders_deltas_until_done() {
        let mut viewer = ReportViewer::new();
        let mut updates = Vec::new();

        viewer
            .render(
                body(vec![
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Incident Report\\n\"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Title: Spill\"}}]}\n\n",
                    "data: [DONE]\n\n",
                ]),
                |text| updates.push(text.to_string()),
            )
            .await;

        assert_eq!(viewer.report(), "Incident Report\nTitle: Spill");
        assert_eq!(viewer.error(), None);
        assert_eq!(updates, vec!["Incident Report\n", "Incident Report\nTitle: Spill"]);
    }

    #[tokio::test]
    async fn spill_scenario_concatenates_deltas() {
        let mut viewer = ReportViewer::new();

        viewer
            .render(
                body(vec![
                    "data: {\"choices\":[{\"delta\":{\"content\":\"A spill \"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"occurred at \"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Lab A.\"}}]}\n\n",
                    "data: [DONE]\n\n",
                ]),
                |_| {},
            )
            .await;

        assert_eq!(viewer.report(), "A spill occurred at Lab A.");
        assert_eq!(viewer.error(), None);
    }

    #[tokio::test]
    async fn error_frame_replaces_report_with_banner() {
        let mut viewer = ReportViewer::new();

        viewer
            .render(
                body(vec![
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Partial\"}}]}\n\n",
                    "data: {\"error\":\"rate limited\"}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
                ]),
                |_| {},
            )
            .await;

        assert_eq!(viewer.report(), "");
        assert_eq!(
            viewer.error().map(ToString::to_string).as_deref(),
            Some("Stream error: rate limited")
        );
    }

    #[tokio::test]
    async fn frame_split_across_reads_is_reassembled() {
        let mut viewer = ReportViewer::new();

        viewer
            .render(
                body(vec![
                    "data: {\"choices\":[{\"del",
                    "ta\":{\"content\":\"Hello\"}}]}\n",
                    "\n: ping\n\ndata: [DONE]\n\n",
                ]),
                |_| {},
            )
            .await;

        assert_eq!(viewer.report(), "Hello");
        assert_eq!(viewer.error(), None);
    }

    #[tokio::test]
    async fn malformed_frame_aborts_rendering() {
        let mut viewer = ReportViewer::new();

        viewer
            .render(
                body(vec![
                    "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
                    "data: {not json\n\n",
                ]),
                |_| {},
            )
            .await;

        assert_eq!(viewer.report(), "");
        assert_eq!(viewer.error(), Some(&ViewerError::Parse));
    }

    #[tokio::test]
    async fn empty_stream_reports_no_content() {
        let mut viewer = ReportViewer::new();
        viewer.render(body(vec!["data: [DONE]\n\n"]), |_| {}).await;

        assert_eq!(viewer.error(), Some(&ViewerError::NoContent));
    }

    #[tokio::test]
    async fn transport_failure_clears_report() {
        let mut viewer = ReportViewer::new();
        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"Half\"}}]}\n\n"),
            Err(std::io::Error::other("connection reset")),
        ];

        viewer.render(stream::iter(chunks), |_| {}).await;

        assert_eq!(viewer.report(), "");
        assert_eq!(
            viewer.error(),
            Some(&ViewerError::Transport("connection reset".into()))
        );
    }

    #[tokio::test]
    async fn new_render_discards_previous_state() {
        let mut viewer = ReportViewer::new();
        viewer.fail_request("All fields are required");
        viewer.save("old");
        assert!(viewer.edit());

        viewer
            .render(
                body(vec!["data: {\"choices\":[{\"delta\":{\"content\":\"new\"}}]}\n\ndata: [DONE]\n\n"]),
                |_| {},
            )
            .await;

        assert_eq!(viewer.report(), "new");
        assert_eq!(viewer.mode(), &Mode::Viewing);
        assert_eq!(viewer.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn copy_acknowledgment_lasts_two_seconds() {
        let mut viewer = ReportViewer::new();
        viewer.save("Incident Report");
        let mut clipboard = MemoryClipboard::new();

        assert_eq!(viewer.copy_label(), "Copy");
        viewer.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard.read_text().unwrap(), "Incident Report");
        assert_eq!(viewer.copy_label(), "Copied!");

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(viewer.is_copied());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(viewer.copy_label(), "Copy");
    }

    #[test]
    fn edit_then_save_commits_draft() {
        let mut viewer = ReportViewer::new();
        assert!(!viewer.edit());

        viewer.save("Draft one");
        assert!(viewer.edit());
        viewer.set_draft("Draft two");
        assert_eq!(viewer.displayed_text(), "Draft two");
        assert_eq!(viewer.report(), "Draft one");

        let text = viewer.displayed_text().to_string();
        viewer.save(text.clone());
        viewer.save(text);
        assert_eq!(viewer.report(), "Draft two");
        assert_eq!(viewer.mode(), &Mode::Viewing);
    }

    #[test]
    fn draft_is_capped() {
        let mut viewer = ReportViewer::new();
        viewer.save("short");
        viewer.edit();
        viewer.set_draft("ü".repeat(DRAFT_MAX_CHARS + 50));

        assert_eq!(viewer.displayed_text().chars().count(), DRAFT_MAX_CHARS);
        assert_eq!(viewer.report(), "short");
    }

    #[test]
    fn copy_while_editing_uses_draft() {
        let mut viewer = ReportViewer::new();
        viewer.save("saved");
        viewer.edit();
        viewer.set_draft("unsaved");

        let mut clipboard = MemoryClipboard::new();
        viewer.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard.read_text().unwrap(), "unsaved");
    }

    #[test]
    fn save_pdf_writes_file() {
        let mut viewer = ReportViewer::new();
        viewer.save("Incident Report\nTitle: Spill");

        let path = std::env::temp_dir().join(format!("incident-{}.pdf", std::process::id()));
        viewer.save_pdf(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(bytes.starts_with(b"%PDF"));
    }
}
