//! Event and message shapes for both transports.
//!
//! [`StreamEvent`] is the nested, SSE-facing catalogue; [`SocketMessage`] is
//! the flat shape pushed over the WebSocket. Both serialize with an embedded
//! `type` tag so clients can dispatch without looking at transport framing.

use serde::{Deserialize, Serialize};

use crate::models::{ChatRole, ResponseEnvelope, Usage};

/// Metadata announced by `message_start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageMeta {
    pub id: String,
    pub role: ChatRole,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamError {
    pub message: String,
}

/// One protocol event in a streamed reply. Events are produced in a strict
/// linear order per reply; see [`crate::stream::sequencer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart { message: MessageMeta },
    ContentBlockStart { index: u32, content_block: ContentBlock },
    ContentBlockDelta { index: u32, delta: Delta },
    ContentBlockStop { index: u32 },
    MessageStop { usage: Usage },
    Error { error: StreamError },
}

impl StreamEvent {
    /// The wire tag, used as the SSE `event:` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageStart { .. } => "message_start",
            Self::ContentBlockStart { .. } => "content_block_start",
            Self::ContentBlockDelta { .. } => "content_block_delta",
            Self::ContentBlockStop { .. } => "content_block_stop",
            Self::MessageStop { .. } => "message_stop",
            Self::Error { .. } => "error",
        }
    }

    pub fn message_start(envelope: &ResponseEnvelope) -> Self {
        Self::MessageStart {
            message: MessageMeta {
                id: envelope.id.clone(),
                role: envelope.role,
                model: envelope.model.clone(),
            },
        }
    }

    pub fn block_start() -> Self {
        Self::ContentBlockStart {
            index: 0,
            content_block: ContentBlock::Text,
        }
    }

    pub fn delta(text: impl Into<String>) -> Self {
        Self::ContentBlockDelta {
            index: 0,
            delta: Delta::TextDelta { text: text.into() },
        }
    }

    pub fn block_stop() -> Self {
        Self::ContentBlockStop { index: 0 }
    }

    pub fn message_stop(usage: Usage) -> Self {
        Self::MessageStop { usage }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: StreamError {
                message: message.into(),
            },
        }
    }
}

/// Outbound WebSocket message. Flatter than [`StreamEvent`]: just a tag plus
/// an optional `content` or `message` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocketMessage {
    System { content: String },
    MessageReceived,
    Status { content: String },
    StreamStart,
    StreamChunk { content: String },
    StreamEnd,
    Error { message: String },
}

/// Inbound WebSocket message. Only `user_message` triggers a reply; every
/// other tag decodes to `Unsupported` and is silently ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundSocketMessage {
    UserMessage {
        content: String,
    },
    #[serde(other)]
    Unsupported,
}
