//! Drives the fixed protocol-event sequence for one reply.
//!
//! The sequence is strictly linear and runs exactly once per envelope:
//! `message_start`, `content_block_start`, one `content_block_delta` per
//! character, `content_block_stop`, `message_stop`. Inter-event delays sit
//! behind the [`Pacer`] trait so tests can run the sequence without a clock,
//! and emission goes through [`StreamSink`] so both transports share the
//! same ordering logic with different framing.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngExt;
use serde::Deserialize;
use thiserror::Error;

use crate::models::ResponseEnvelope;
use crate::stream::event::StreamEvent;

/// Why an emit failed mid-sequence.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The peer is gone. Remaining steps are abandoned without further emits.
    #[error("stream sink closed by peer")]
    Closed,
    #[error("failed to encode stream event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for sequenced events. Implementations encode and push one
/// event per call; a `Closed` error aborts the rest of the sequence.
#[async_trait]
pub trait StreamSink: Send {
    async fn send(&mut self, event: StreamEvent) -> Result<(), SinkError>;
}

/// Source of inter-event delays. The sequencer never sleeps directly.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspend for a duration drawn uniformly from `range` (milliseconds).
    async fn pause(&self, range: RangeInclusive<u64>);
}

/// Production pacer: uniform random sleep on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, range: RangeInclusive<u64>) {
        let ms = rand::rng().random_range(range);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

/// Inter-event delays for one stream, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamPacing {
    pub message_start_ms: u64,
    pub block_start_ms: u64,
    pub delta_min_ms: u64,
    pub delta_max_ms: u64,
    pub block_stop_lead_ms: u64,
    pub block_stop_ms: u64,
}

impl StreamPacing {
    /// Protocol defaults for the SSE transport: 20-140ms per character.
    pub fn sse() -> Self {
        Self {
            message_start_ms: 100,
            block_start_ms: 50,
            delta_min_ms: 20,
            delta_max_ms: 140,
            block_stop_lead_ms: 100,
            block_stop_ms: 50,
        }
    }

    /// Defaults for the socket transport: 20-80ms per character.
    pub fn socket() -> Self {
        Self {
            delta_min_ms: 20,
            delta_max_ms: 80,
            ..Self::sse()
        }
    }

    /// All delays zero. Used by tests to run a sequence without a clock.
    pub fn immediate() -> Self {
        Self {
            message_start_ms: 0,
            block_start_ms: 0,
            delta_min_ms: 0,
            delta_max_ms: 0,
            block_stop_lead_ms: 0,
            block_stop_ms: 0,
        }
    }

    fn delta_range(&self) -> RangeInclusive<u64> {
        self.delta_min_ms..=self.delta_max_ms
    }
}

fn fixed(ms: u64) -> RangeInclusive<u64> {
    ms..=ms
}

/// Drive the full event sequence for one envelope into `sink`.
///
/// A closed sink aborts the remaining steps immediately. An encode failure
/// emits a single `error` event (best effort) and stops; no content events
/// follow an error. The sink itself is the output channel and is closed by
/// the caller dropping it, exactly once on every path.
pub async fn run_sequence<S: StreamSink>(
    envelope: &ResponseEnvelope,
    pacing: &StreamPacing,
    pacer: &dyn Pacer,
    sink: &mut S,
) -> Result<(), SinkError> {
    match drive(envelope, pacing, pacer, sink).await {
        Err(SinkError::Encode(err)) => {
            tracing::debug!(id = %envelope.id, error = %err, "emitting in-band error event");
            let _ = sink.send(StreamEvent::error(err.to_string())).await;
            Err(SinkError::Encode(err))
        }
        other => other,
    }
}

async fn drive<S: StreamSink>(
    envelope: &ResponseEnvelope,
    pacing: &StreamPacing,
    pacer: &dyn Pacer,
    sink: &mut S,
) -> Result<(), SinkError> {
    sink.send(StreamEvent::message_start(envelope)).await?;
    pacer.pause(fixed(pacing.message_start_ms)).await;

    sink.send(StreamEvent::block_start()).await?;
    pacer.pause(fixed(pacing.block_start_ms)).await;

    // One delta per Unicode character, so CJK text is never split mid-char.
    for unit in envelope.content.chars() {
        sink.send(StreamEvent::delta(unit.to_string())).await?;
        pacer.pause(pacing.delta_range()).await;
    }

    pacer.pause(fixed(pacing.block_stop_lead_ms)).await;
    sink.send(StreamEvent::block_stop()).await?;
    pacer.pause(fixed(pacing.block_stop_ms)).await;

    sink.send(StreamEvent::message_stop(envelope.usage)).await?;
    Ok(())
}
