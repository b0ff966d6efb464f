//! The streaming delivery protocol layer.
//!
//! One reply is delivered as a fixed sequence of protocol events. The
//! [`sequencer`] drives that sequence against an abstract sink, [`encoder`]
//! turns events into wire frames for either transport, and [`event`] defines
//! the catalogue of event and message shapes.

pub mod encoder;
pub mod event;
pub mod sequencer;

pub use event::{InboundSocketMessage, SocketMessage, StreamEvent};
pub use sequencer::{Pacer, SinkError, StreamPacing, StreamSink, TokioPacer, run_sequence};
