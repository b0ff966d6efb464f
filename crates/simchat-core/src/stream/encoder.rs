//! Wire framing for stream events.
//!
//! SSE frames are `event:` + single-line JSON `data:` terminated by a blank
//! line. Socket frames are one compact JSON object per message. Both are
//! injective per event: the tag and payload are always recoverable, and
//! adjacent deltas are never merged.

use crate::stream::event::{Delta, SocketMessage, StreamEvent};

/// Format one event as an SSE frame.
///
/// `serde_json::to_string` output is compact, so the JSON line never
/// contains a raw newline and the trailing blank line is the only frame
/// delimiter on the wire.
pub fn sse_frame(event: &StreamEvent) -> serde_json::Result<String> {
    let data = serde_json::to_string(event)?;
    Ok(format!("event: {}\ndata: {}\n\n", event.name(), data))
}

/// Serialize one socket message as a discrete JSON text frame.
pub fn socket_frame(message: &SocketMessage) -> serde_json::Result<String> {
    serde_json::to_string(message)
}

/// Translate a sequencer event into the flat socket shape.
///
/// `message_start` and `content_block_stop` have no socket counterpart and
/// return `None`; the socket sink skips them, which yields exactly the
/// `stream_start`, `stream_chunk`*, `stream_end` sequence clients expect.
pub fn socket_event(event: &StreamEvent) -> Option<SocketMessage> {
    match event {
        StreamEvent::MessageStart { .. } | StreamEvent::ContentBlockStop { .. } => None,
        StreamEvent::ContentBlockStart { .. } => Some(SocketMessage::StreamStart),
        StreamEvent::ContentBlockDelta {
            delta: Delta::TextDelta { text },
            ..
        } => Some(SocketMessage::StreamChunk {
            content: text.clone(),
        }),
        StreamEvent::MessageStop { .. } => Some(SocketMessage::StreamEnd),
        StreamEvent::Error { error } => Some(SocketMessage::Error {
            message: error.message.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_frame_is_byte_exact() {
        let frame = sse_frame(&StreamEvent::delta("嗨")).unwrap();
        assert_eq!(
            frame,
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"嗨\"}}\n\n"
        );
    }

    #[test]
    fn sse_frame_never_embeds_a_blank_line() {
        // Multi-line template text must stay escaped inside the JSON.
        let frame = sse_frame(&StreamEvent::delta("line one\n\nline two")).unwrap();
        assert_eq!(frame.matches("\n\n").count(), 1);
        assert!(frame.ends_with("\n\n"));
    }

    #[test]
    fn socket_frame_is_one_compact_object() {
        let frame = socket_frame(&SocketMessage::StreamChunk {
            content: "x".to_string(),
        })
        .unwrap();
        assert_eq!(frame, r#"{"type":"stream_chunk","content":"x"}"#);
        assert!(!frame.contains('\n'));
    }

    #[test]
    fn sequencer_events_map_onto_socket_messages() {
        assert_eq!(
            socket_event(&StreamEvent::block_start()),
            Some(SocketMessage::StreamStart)
        );
        assert_eq!(
            socket_event(&StreamEvent::delta("a")),
            Some(SocketMessage::StreamChunk {
                content: "a".to_string()
            })
        );
        assert_eq!(
            socket_event(&StreamEvent::message_stop(crate::models::Usage {
                input_tokens: 0,
                output_tokens: 0,
            })),
            Some(SocketMessage::StreamEnd)
        );
        assert_eq!(
            socket_event(&StreamEvent::error("oops")),
            Some(SocketMessage::Error {
                message: "oops".to_string()
            })
        );

        let envelope = crate::models::ResponseEnvelope::new("hi", "ok".to_string());
        assert_eq!(socket_event(&StreamEvent::message_start(&envelope)), None);
        assert_eq!(socket_event(&StreamEvent::block_stop()), None);
    }
}
