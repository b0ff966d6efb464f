//! Chat completions endpoint.
//!
//! One request in, either a complete JSON message or an SSE byte stream of
//! protocol events out. The streaming branch spawns the sequencer onto its
//! own task and feeds the response body through a channel; a client
//! disconnect surfaces as a channel-send failure at the next emit.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use simchat_core::{
    models::{ChatMessage, ChatRole, ResponseEnvelope, Usage},
    responder,
    stream::{SinkError, StreamEvent, StreamSink, encoder, run_sequence},
};

use crate::{error::ApiError, state::SharedState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    /// Accepted for API-shape compatibility; never applied.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Non-streaming response document.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub role: ChatRole,
    pub content: Vec<ContentPart>,
    pub model: String,
    pub usage: Usage,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl From<ResponseEnvelope> for MessageResponse {
    fn from(envelope: ResponseEnvelope) -> Self {
        Self {
            id: envelope.id,
            kind: "message",
            role: envelope.role,
            content: vec![ContentPart {
                kind: "text",
                text: envelope.content,
            }],
            model: envelope.model,
            usage: envelope.usage,
            timestamp: envelope.timestamp,
        }
    }
}

// POST /api/chat/completions
pub async fn chat_completions(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let Some(last) = request.messages.last() else {
        return Err(ApiError::bad_request(
            "Invalid request: messages array required",
        ));
    };
    if last.role != ChatRole::User {
        return Err(ApiError::bad_request("Last message must be from user"));
    }

    tracing::debug!(
        message_count = request.messages.len(),
        stream = request.stream,
        max_tokens = ?request.max_tokens,
        preview = %preview(&last.content),
        "chat completion request"
    );

    let envelope = responder::select_response(&last.content);

    if !request.stream {
        return Ok(Json(MessageResponse::from(envelope)).into_response());
    }

    stream_response(state, envelope)
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

fn stream_response(state: SharedState, envelope: ResponseEnvelope) -> Result<Response, ApiError> {
    let (tx, rx) = mpsc::channel::<Result<String, Infallible>>(32);

    tokio::spawn(async move {
        let mut sink = SseChannelSink { tx };
        let outcome =
            run_sequence(&envelope, &state.sse_pacing, state.pacer.as_ref(), &mut sink).await;
        match outcome {
            Ok(()) => tracing::debug!(id = %envelope.id, "stream complete"),
            Err(SinkError::Closed) => {
                tracing::debug!(id = %envelope.id, "client disconnected mid-stream")
            }
            Err(err) => tracing::error!(id = %envelope.id, error = %err, "stream failed"),
        }
        // Dropping the sink closes the body channel exactly once.
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        // Disable nginx buffering so frames reach the client as sent.
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(ReceiverStream::new(rx)))
        .map_err(|err| ApiError::internal(err.to_string()))
}

/// Encodes events as SSE frames and pushes them into the response body.
struct SseChannelSink {
    tx: mpsc::Sender<Result<String, Infallible>>,
}

#[async_trait]
impl StreamSink for SseChannelSink {
    async fn send(&mut self, event: StreamEvent) -> Result<(), SinkError> {
        let frame = encoder::sse_frame(&event)?;
        self.tx.send(Ok(frame)).await.map_err(|_| SinkError::Closed)
    }
}
