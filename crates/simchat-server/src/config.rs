//! Server configuration: optional TOML file with environment fallback.

use serde::Deserialize;
use simchat_core::stream::StreamPacing;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub pacing: PacingConfig,
}

/// Artificial delay ranges, all in milliseconds. These pace the simulated
/// typing; they are not flow control.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_sse_delta_min")]
    pub sse_delta_min_ms: u64,
    #[serde(default = "default_sse_delta_max")]
    pub sse_delta_max_ms: u64,
    #[serde(default = "default_socket_delta_min")]
    pub socket_delta_min_ms: u64,
    #[serde(default = "default_socket_delta_max")]
    pub socket_delta_max_ms: u64,
    #[serde(default = "default_thinking_min")]
    pub thinking_min_ms: u64,
    #[serde(default = "default_thinking_max")]
    pub thinking_max_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            sse_delta_min_ms: default_sse_delta_min(),
            sse_delta_max_ms: default_sse_delta_max(),
            socket_delta_min_ms: default_socket_delta_min(),
            socket_delta_max_ms: default_socket_delta_max(),
            thinking_min_ms: default_thinking_min(),
            thinking_max_ms: default_thinking_max(),
        }
    }
}

impl PacingConfig {
    pub fn sse_pacing(&self) -> StreamPacing {
        StreamPacing {
            delta_min_ms: self.sse_delta_min_ms,
            delta_max_ms: self.sse_delta_max_ms,
            ..StreamPacing::sse()
        }
    }

    pub fn socket_pacing(&self) -> StreamPacing {
        StreamPacing {
            delta_min_ms: self.socket_delta_min_ms,
            delta_max_ms: self.socket_delta_max_ms,
            ..StreamPacing::socket()
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    pacing: PacingConfig,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_sse_delta_min() -> u64 {
    20
}

fn default_sse_delta_max() -> u64 {
    140
}

fn default_socket_delta_min() -> u64 {
    20
}

fn default_socket_delta_max() -> u64 {
    80
}

fn default_thinking_min() -> u64 {
    500
}

fn default_thinking_max() -> u64 {
    1500
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(Self {
                host: file_config.server.host,
                port: file_config.server.port,
                pacing: file_config.pacing,
            });
        }

        Ok(Self::from_env())
    }

    fn from_env() -> Self {
        let host = env::var("SIMCHAT_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("SIMCHAT_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);

        Self {
            host,
            port,
            pacing: PacingConfig::default(),
        }
    }
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("SIMCHAT_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("simchat.toml").exists() {
        Some("simchat.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sections_are_optional() {
        let parsed: FileConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.server.port, 3000);
        assert_eq!(parsed.pacing.sse_delta_max_ms, 140);
        assert_eq!(parsed.pacing.socket_delta_max_ms, 80);
    }

    #[test]
    fn pacing_overrides_apply_to_stream_defaults() {
        let parsed: FileConfig = toml::from_str(
            "[pacing]\nsse_delta_min_ms = 1\nsse_delta_max_ms = 2\nsocket_delta_max_ms = 9\n",
        )
        .unwrap();
        let sse = parsed.pacing.sse_pacing();
        assert_eq!((sse.delta_min_ms, sse.delta_max_ms), (1, 2));
        assert_eq!(sse.message_start_ms, 100);
        assert_eq!(parsed.pacing.socket_pacing().delta_max_ms, 9);
    }
}
