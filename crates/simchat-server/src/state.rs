//! Shared application state.
//!
//! Everything here is read-only after startup. Each request or connection
//! runs in its own task; there is no cross-request mutable state, so no
//! locks are needed anywhere in the server.

use std::sync::Arc;

use simchat_core::stream::{Pacer, StreamPacing, TokioPacer};

use crate::config::ServerConfig;

pub struct AppState {
    pub sse_pacing: StreamPacing,
    pub socket_pacing: StreamPacing,
    /// Simulated "thinking" window before a socket reply starts streaming.
    pub thinking_min_ms: u64,
    pub thinking_max_ms: u64,
    pub pacer: Arc<dyn Pacer>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn from_config(config: &ServerConfig) -> SharedState {
        Arc::new(Self {
            sse_pacing: config.pacing.sse_pacing(),
            socket_pacing: config.pacing.socket_pacing(),
            thinking_min_ms: config.pacing.thinking_min_ms,
            thinking_max_ms: config.pacing.thinking_max_ms,
            pacer: Arc::new(TokioPacer),
        })
    }

    /// State with all artificial delays zeroed, for tests.
    #[cfg(test)]
    pub fn immediate() -> SharedState {
        Arc::new(Self {
            sse_pacing: StreamPacing::immediate(),
            socket_pacing: StreamPacing::immediate(),
            thinking_min_ms: 0,
            thinking_max_ms: 0,
            pacer: Arc::new(TokioPacer),
        })
    }
}
