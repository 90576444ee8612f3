pub mod error;
pub mod fragment;
pub mod prompt;
pub mod record;
pub mod sse;
pub mod traits;

pub use error::{CoreError, FragmentError, ProviderError};
pub use fragment::{StreamFragment, DONE_SENTINEL};
pub use prompt::{build_prompt, CompletionRequest};
pub use record::{Field, IncidentRecord, IncidentSubmission};
pub use sse::{SseDecoder, SseFrame};
pub use traits::{CompletionProvider, DeltaStream};
