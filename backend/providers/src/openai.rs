use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use incident_core::{
    CompletionProvider, CompletionRequest, DeltaStream, ProviderError, SseDecoder, SseFrame,
    DONE_SENTINEL,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Connection settings for an OpenAI-compatible chat-completion API.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// OpenAI chat-completion provider with token streaming.
pub struct OpenAiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ProviderError::MissingCredential)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn stream_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<DeltaStream, ProviderError> {
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.user_prompt,
            }],
            stream: true,
        };

        debug!(model = %self.settings.model, "Opening completion stream");

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.settings.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(delta_stream(response.bytes_stream()))
    }
}

struct DeltaState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    ready: VecDeque<Result<String, ProviderError>>,
    finished: bool,
}

impl<S> DeltaState<S> {
    fn handle(&mut self, frame: SseFrame) {
        if self.finished || frame.data.trim().is_empty() {
            return;
        }
        if frame.data.trim() == DONE_SENTINEL {
            self.finished = true;
            return;
        }

        let chunk: Value = match serde_json::from_str(&frame.data) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "Malformed upstream chunk");
                self.fail(format!("malformed chunk: {e}"));
                return;
            }
        };

        if let Some(error) = chunk.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            self.fail(message);
            return;
        }

        if let Some(content) = chunk
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
        {
            self.ready.push_back(Ok(content.to_string()));
        }
    }

    fn fail(&mut self, message: String) {
        self.ready.push_back(Err(ProviderError::Stream(message)));
        self.finished = true;
    }
}

/// Turns an upstream `text/event-stream` body into content deltas.
///
/// Stops at `[DONE]` or the end of the body. An upstream error object, a
/// malformed chunk or a transport failure yields one `ProviderError::Stream`
/// and ends the stream.
pub fn delta_stream<S, E>(body: S) -> DeltaStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DeltaState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    let stream = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for frame in state.decoder.push(&bytes) {
                        state.handle(frame);
                    }
                }
                Some(Err(e)) => state.fail(e.to_string()),
                None => {
                    if let Some(frame) = state.decoder.finish() {
                        state.handle(frame);
                    }
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(stream)
}
