use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ProviderError;
use crate::prompt::CompletionRequest;

/// Incremental text deltas from a provider, in arrival order.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Trait for text-generation backends used by the report relay.
///
/// Providers are constructed once at startup and shared for the process
/// lifetime; each call opens one independent upstream stream.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "openai", "scripted").
    fn name(&self) -> &str;

    /// Open a streaming completion.
    ///
    /// Errors returned here happen before any delta exists and are reported
    /// to the caller as a plain failure; errors yielded by the stream happen
    /// mid-flight.
    async fn stream_completion(&self, request: &CompletionRequest)
        -> Result<DeltaStream, ProviderError>;
}
