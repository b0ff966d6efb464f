//! Transport-independent core for the SimChat demo server.
//!
//! SimChat simulates a conversational AI API: replies come from a fixed
//! template table, but they are delivered through the same streaming
//! machinery a real model API would use. This crate holds everything that
//! does not depend on a concrete transport: the data model, the canned
//! response selector, the stream event catalogue, wire framing for both
//! transports, and the sequencer that paces one reply onto a sink.

pub mod models;
pub mod responder;
pub mod stream;

pub use models::{ChatMessage, ChatRole, ResponseEnvelope, Usage};
pub use responder::{ResponseCategory, categorize, select_response};
