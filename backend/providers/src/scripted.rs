use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use incident_core::{CompletionProvider, CompletionRequest, DeltaStream, ProviderError};

#[derive(Debug, Clone)]
enum Failure {
    BeforeStream { status: u16, body: String },
    MidStream(String),
}

/// A provider that replays canned deltas.
///
/// Used by tests and by `serve --mock` to run the relay without an upstream
/// credential. Every request it receives is recorded.
pub struct ScriptedProvider {
    name: String,
    deltas: Vec<String>,
    failure: Option<Failure>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "scripted".to_string(),
            deltas: deltas.into_iter().map(Into::into).collect(),
            failure: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Splits `text` into word-sized deltas, keeping the separating spaces.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split_inclusive(' '))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Yield a stream error after the scripted deltas.
    pub fn fail_mid_stream(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(Failure::MidStream(message.into()));
        self
    }

    /// Reject the request before any delta is produced.
    pub fn fail_before_stream(mut self, status: u16, body: impl Into<String>) -> Self {
        self.failure = Some(Failure::BeforeStream {
            status,
            body: body.into(),
        });
        self
    }

    /// Pause before each delta.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<DeltaStream, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let mut items: Vec<Result<String, ProviderError>> =
            self.deltas.iter().cloned().map(Ok).collect();
        match &self.failure {
            Some(Failure::BeforeStream { status, body }) => {
                return Err(ProviderError::Upstream {
                    status: *status,
                    body: body.clone(),
                });
            }
            Some(Failure::MidStream(message)) => {
                items.push(Err(ProviderError::Stream(message.clone())));
            }
            None => {}
        }

        let delay = self.delay;
        let stream = stream::iter(items).then(move |item| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            item
        });
        Ok(Box::pin(stream))
    }
}
