//! Message and response envelope types shared by both transports.

use chrono::{SecondsFormat, Utc};
use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Model name reported in every generated envelope.
pub const SIMULATED_MODEL: &str = "simulated-ai-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One inbound conversation message. Input-only; nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Rough token accounting for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn estimate(input: &str, output: &str) -> Self {
        Self {
            input_tokens: estimate_tokens(input),
            output_tokens: estimate_tokens(output),
        }
    }
}

/// Half the character count, rounded up. Not a real tokenizer; roughly
/// matches 1.5 chars/token for CJK text and undercounts English.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(2)
}

/// One generated reply plus its synthesized metadata, held in memory for the
/// duration of a single delivery and then dropped.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub model: String,
    pub usage: Usage,
    pub timestamp: String,
}

impl ResponseEnvelope {
    pub fn new(user_text: &str, content: String) -> Self {
        let usage = Usage::estimate(user_text, &content);
        Self {
            id: generate_message_id(),
            role: ChatRole::Assistant,
            content,
            model: SIMULATED_MODEL.to_string(),
            usage,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// `msg_<unix-millis>_<random suffix>`. Never reused.
fn generate_message_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!(
        "msg_{}_{}",
        Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase()
    )
}
