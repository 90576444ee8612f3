use thiserror::Error;

use crate::record::Field;

/// Errors raised while accepting an incident report request.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(Field),
}

/// Errors reported by an upstream completion provider.
///
/// `MissingCredential` and `Upstream` happen before the first delta is
/// produced; `Stream` only ever appears inside a running [`crate::DeltaStream`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("upstream credential is not configured")]
    MissingCredential,

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream stream failed: {0}")]
    Stream(String),
}

/// A relay frame whose payload could not be understood.
#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("malformed frame payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
