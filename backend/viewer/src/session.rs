use tracing::debug;

use crate::client::ReportClient;
use crate::form::IncidentForm;
use crate::viewer::ReportViewer;

/// One user's form and viewer wired to a relay.
#[derive(Debug)]
pub struct ReportSession {
    pub form: IncidentForm,
    pub viewer: ReportViewer,
    client: ReportClient,
}

impl ReportSession {
    pub fn new(client: ReportClient) -> Self {
        Self {
            form: IncidentForm::new(),
            viewer: ReportViewer::new(),
            client,
        }
    }

    /// Validates the form and, if it passes, streams a report into the
    /// viewer. Returns `false` when validation blocked the request.
    pub async fn submit(&mut self, on_update: impl FnMut(&str)) -> bool {
        let mut record = None;
        if !self.form.submit(|r| record = Some(r)) {
            debug!(fields = ?self.form.fields_with_errors(), "form has missing fields");
            return false;
        }
        let Some(record) = record else {
            return false;
        };

        self.client.generate(&record, &mut self.viewer, on_update).await;
        true
    }
}
