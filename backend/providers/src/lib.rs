pub mod openai;
pub mod scripted;

pub use openai::{OpenAiProvider, ProviderSettings};
pub use scripted::ScriptedProvider;
