//! WebSocket endpoint: bidirectional chat with simulated streaming replies.
//!
//! Per-connection flow: a `system` welcome on open, then one fully
//! sequenced reply per inbound `user_message`. Turns never pipeline; the
//! next inbound message is read only after the current reply finishes.
//! Malformed payloads get an in-band `error` message and the connection
//! stays open.

use async_trait::async_trait;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};

use simchat_core::{
    responder,
    stream::{
        InboundSocketMessage, SinkError, SocketMessage, StreamEvent, StreamSink, encoder,
        run_sequence,
    },
};

use crate::state::SharedState;

const WELCOME: &str = "Connected to the simulated AI server";

// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    tracing::info!("websocket client connected");
    let mut conn = WsConnection { socket };

    let welcome = SocketMessage::System {
        content: WELCOME.to_string(),
    };
    if conn.send_msg(welcome).await.is_err() {
        return;
    }

    loop {
        let Some(inbound) = conn.socket.recv().await else {
            break;
        };
        let message = match inbound {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = %err, "websocket receive error");
                break;
            }
        };
        match message {
            Message::Text(text) => {
                if run_turn(text.as_str(), &state, &mut conn).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            // Binary, ping and pong frames carry nothing for us.
            _ => {}
        }
    }

    tracing::info!("websocket client disconnected");
}

/// Outbound half of a socket connection, abstracted so turn logic is
/// testable without a live upgrade.
#[async_trait]
trait Outbound: Send {
    async fn send_msg(&mut self, message: SocketMessage) -> Result<(), SinkError>;
}

struct WsConnection {
    socket: WebSocket,
}

#[async_trait]
impl Outbound for WsConnection {
    async fn send_msg(&mut self, message: SocketMessage) -> Result<(), SinkError> {
        let frame = encoder::socket_frame(&message)?;
        self.socket
            .send(Message::Text(frame.into()))
            .await
            .map_err(|_| SinkError::Closed)
    }
}

/// Adapts the sequencer's event stream onto flat socket messages.
struct SocketEventSink<'a, O: Outbound> {
    out: &'a mut O,
}

#[async_trait]
impl<O: Outbound> StreamSink for SocketEventSink<'_, O> {
    async fn send(&mut self, event: StreamEvent) -> Result<(), SinkError> {
        match encoder::socket_event(&event) {
            Some(message) => self.out.send_msg(message).await,
            None => Ok(()),
        }
    }
}

/// Process one inbound payload to completion. Returns `Err` only when the
/// peer is gone; malformed payloads and unknown tags are handled in-band.
async fn run_turn<O: Outbound>(
    raw: &str,
    state: &SharedState,
    out: &mut O,
) -> Result<(), SinkError> {
    let inbound: InboundSocketMessage = match serde_json::from_str(raw) {
        Ok(inbound) => inbound,
        Err(err) => {
            tracing::debug!(error = %err, "malformed websocket payload");
            return out
                .send_msg(SocketMessage::Error {
                    message: err.to_string(),
                })
                .await;
        }
    };

    let InboundSocketMessage::UserMessage { content } = inbound else {
        return Ok(());
    };

    out.send_msg(SocketMessage::MessageReceived).await?;
    out.send_msg(SocketMessage::Status {
        content: "thinking".to_string(),
    })
    .await?;
    state
        .pacer
        .pause(state.thinking_min_ms..=state.thinking_max_ms)
        .await;

    let envelope = responder::select_response(&content);
    let mut sink = SocketEventSink { out };
    match run_sequence(
        &envelope,
        &state.socket_pacing,
        state.pacer.as_ref(),
        &mut sink,
    )
    .await
    {
        Ok(()) => {
            tracing::debug!(id = %envelope.id, "websocket reply complete");
            Ok(())
        }
        // The error event was already delivered in-band; keep the connection.
        Err(SinkError::Encode(_)) => Ok(()),
        Err(SinkError::Closed) => Err(SinkError::Closed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    struct RecordedOutbound {
        sent: Vec<SocketMessage>,
    }

    #[async_trait]
    impl Outbound for RecordedOutbound {
        async fn send_msg(&mut self, message: SocketMessage) -> Result<(), SinkError> {
            self.sent.push(message);
            Ok(())
        }
    }

    fn outbound() -> RecordedOutbound {
        RecordedOutbound { sent: Vec::new() }
    }

    #[tokio::test]
    async fn user_message_turn_emits_the_expected_sequence() {
        let state = AppState::immediate();
        let mut out = outbound();
        run_turn(r#"{"type": "user_message", "content": "?"}"#, &state, &mut out)
            .await
            .unwrap();

        assert_eq!(out.sent[0], SocketMessage::MessageReceived);
        assert_eq!(
            out.sent[1],
            SocketMessage::Status {
                content: "thinking".to_string()
            }
        );
        assert_eq!(out.sent[2], SocketMessage::StreamStart);
        assert_eq!(out.sent.last(), Some(&SocketMessage::StreamEnd));

        let chunks: Vec<&str> = out
            .sent
            .iter()
            .filter_map(|message| match message {
                SocketMessage::StreamChunk { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert!(!chunks.is_empty());
        // Character-level chunking, multi-byte safe.
        assert!(chunks.iter().all(|chunk| chunk.chars().count() == 1));
        // Nothing but chunks between stream_start and stream_end.
        assert_eq!(out.sent.len(), 4 + chunks.len());
    }

    #[tokio::test]
    async fn malformed_payload_reports_one_error_and_stays_usable() {
        let state = AppState::immediate();
        let mut out = outbound();

        run_turn("not json", &state, &mut out).await.unwrap();
        assert_eq!(out.sent.len(), 1);
        assert!(matches!(out.sent[0], SocketMessage::Error { .. }));

        // The same connection still serves the next valid message.
        run_turn(
            r#"{"type": "user_message", "content": "hello"}"#,
            &state,
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(out.sent[1], SocketMessage::MessageReceived);
        assert_eq!(out.sent.last(), Some(&SocketMessage::StreamEnd));
    }

    #[tokio::test]
    async fn unknown_message_types_are_silently_ignored() {
        let state = AppState::immediate();
        let mut out = outbound();

        run_turn(r#"{"type": "ping"}"#, &state, &mut out)
            .await
            .unwrap();
        run_turn(r#"{"type": "status", "content": "hi"}"#, &state, &mut out)
            .await
            .unwrap();
        assert!(out.sent.is_empty());
    }
}
