use thiserror::Error;

/// Banner message shown in place of the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// The relay refused the request or could not be reached.
    #[error("{0}")]
    Request(String),

    /// The relay reported an upstream failure mid-stream.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Failed to parse streamed data")]
    Parse,

    /// The connection broke while reading the stream.
    #[error("Error generating report: {0}")]
    Transport(String),

    #[error("No report content received")]
    NoContent,
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
