//! Relay Stream Fragments
//!
//! The payload carried by each `data:` line of the report stream, in the
//! chat-completion chunk shape clients already understand.

use serde::{Deserialize, Serialize};

use crate::error::FragmentError;

/// Literal payload of the terminal frame.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One unit of the report stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    /// Incremental text. May be empty when a chunk carried no content.
    Delta(String),
    /// Normal completion.
    Done,
    /// Upstream failure after streaming began.
    Error(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireFrame {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    choices: Vec<WireChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireChoice {
    #[serde(default)]
    delta: WireDelta,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl StreamFragment {
    pub fn delta(content: impl Into<String>) -> Self {
        StreamFragment::Delta(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamFragment::Error(message.into())
    }

    /// Encodes the fragment as the text that follows `data: `.
    pub fn to_data(&self) -> String {
        let frame = match self {
            StreamFragment::Done => return DONE_SENTINEL.to_string(),
            StreamFragment::Delta(content) => WireFrame {
                choices: vec![WireChoice {
                    delta: WireDelta {
                        content: Some(content.clone()),
                    },
                }],
                error: None,
            },
            StreamFragment::Error(message) => WireFrame {
                choices: Vec::new(),
                error: Some(message.clone()),
            },
        };
        // A struct of strings always serializes.
        serde_json::to_string(&frame).unwrap_or_default()
    }

    /// Decodes a `data:` payload.
    ///
    /// An `error` key wins over any content. A chunk without
    /// `choices[0].delta.content` decodes as an empty delta.
    pub fn parse(data: &str) -> Result<Self, FragmentError> {
        let data = data.trim();
        if data == DONE_SENTINEL {
            return Ok(StreamFragment::Done);
        }

        let frame: WireFrame = serde_json::from_str(data)?;
        if let Some(error) = frame.error {
            return Ok(StreamFragment::Error(error));
        }

        let content = frame
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .unwrap_or_default();
        Ok(StreamFragment::Delta(content))
    }
}
