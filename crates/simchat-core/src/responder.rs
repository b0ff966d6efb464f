//! Canned response selection.
//!
//! There is no model here: the input is matched against ordered keyword
//! lists and a reply is drawn at random from the winning category's four
//! templates. Category assignment is deterministic; only the template pick
//! within a category is random.

use rand::RngExt;

use crate::models::ResponseEnvelope;

/// Categories, in match priority order. A message containing both a greeting
/// word and a question mark resolves to `Greeting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCategory {
    Greeting,
    Question,
    Technical,
    Default,
}

const GREETING_TERMS: &[&str] = &["hello", "hi", "hey", "你好", "嗨", "哈囉", "安安"];

const QUESTION_TERMS: &[&str] = &[
    "?", "？", "how", "what", "why", "when", "where", "怎麼", "什麼", "為什麼", "如何", "哪裡",
];

const TECHNICAL_TERMS: &[&str] = &[
    "websocket",
    "sse",
    "api",
    "stream",
    "rust",
    "axum",
    "tokio",
    "code",
    "技術",
    "實現",
    "實作",
    "程式",
];

const GREETING_TEMPLATES: [&str; 4] = [
    "Hello! Great to meet you. I'm a simulated assistant here to exercise the chat plumbing. What would you like to talk about?",
    "Hi there! Welcome to the streaming chat demo. Everything I say is canned, but it arrives one character at a time just like the real thing.",
    "Hey! Ready when you are. I can't actually think, but I can stream convincingly. This server demonstrates WebSocket and SSE delivery side by side.",
    "Hello! Nice to see you. Send me anything and watch how the reply is paced out over the wire, whichever transport you picked.",
];

const QUESTION_TEMPLATES: [&str; 4] = [
    "That's a good question! Let me pretend to think about it...\n\nThe honest answer is that I pick replies from a fixed table, but the delivery pipeline treats them exactly like generated tokens.",
    "You're asking about something interesting. In a real deployment this would involve:\n\n1. An actual language model\n2. Context from earlier turns\n3. Safety and quality filtering\n\nThis demo skips all three and focuses on the transport.",
    "Good question. A few angles worth considering:\n\n• What the client observes on the wire\n• How events are ordered and framed\n• Where errors surface mid-stream\n\nThose are the parts this server actually exercises.",
    "Interesting question! I don't have a real answer for you, but the stream carrying this reply is the same one a genuine model response would ride on.",
];

const TECHNICAL_TEMPLATES: [&str; 4] = [
    "From a technical standpoint, this server is built on:\n\n- axum for routing and both transports\n- tokio for per-connection tasks\n- Server-Sent Events for one-way streaming\n- WebSocket for bidirectional messaging\n\nThe same sequencer drives both paths with different framing.",
    "Good technical topic! Modern services usually pick between:\n\n1. WebSocket — bidirectional, suited to chat\n2. SSE — one-way server push, suited to feeds\n3. Long polling — the compatibility fallback\n\nThis demo implements the first two over one response generator.",
    "A note on the implementation: responses stream character by character here. Real model APIs stream tokens or larger chunks, but single characters make the pacing visible. Production systems also layer on reconnection, acknowledgements, and error recovery.",
    "The key implementation detail is the event sequence:\n\nmessage_start, content_block_start, repeated content_block_delta, content_block_stop, message_stop.\n\nEvery reply follows that exact order, whichever transport carries it.",
];

const DEFAULT_TEMPLATES: [&str; 4] = [
    "Thanks for the message! I matched your text against a few keyword lists and picked this reply. The interesting part is the stream it arrived on.",
    "Got it. A real assistant would parse your meaning and compose something relevant; I just demonstrate how composed text is delivered incrementally to the client.",
    "Message received! Character-by-character delivery like this is what makes chat interfaces feel alive. The same technique powers support widgets, coding assistants, and writing tools.",
    "Noted! Streaming text as it is produced has concrete benefits:\n\n• The first characters arrive quickly\n• Progress is visible instead of a spinner\n• The client can render as it reads\n\nThat experience is what this demo reproduces.",
];

/// Deterministic category assignment: first matching keyword list wins.
/// Matching is lowercase substring membership, so `"Hello?"` is a greeting
/// even though it also carries a question mark.
pub fn categorize(text: &str) -> ResponseCategory {
    let lower = text.to_lowercase();
    let contains_any = |terms: &[&str]| terms.iter().any(|term| lower.contains(term));

    if contains_any(GREETING_TERMS) {
        ResponseCategory::Greeting
    } else if contains_any(QUESTION_TERMS) {
        ResponseCategory::Question
    } else if contains_any(TECHNICAL_TERMS) {
        ResponseCategory::Technical
    } else {
        ResponseCategory::Default
    }
}

fn templates_for(category: ResponseCategory) -> &'static [&'static str; 4] {
    match category {
        ResponseCategory::Greeting => &GREETING_TEMPLATES,
        ResponseCategory::Question => &QUESTION_TEMPLATES,
        ResponseCategory::Technical => &TECHNICAL_TEMPLATES,
        ResponseCategory::Default => &DEFAULT_TEMPLATES,
    }
}

/// Pick a reply for `user_text` and wrap it in a fresh envelope. Always
/// succeeds; empty input falls through to the default category.
pub fn select_response(user_text: &str) -> ResponseEnvelope {
    let templates = templates_for(categorize(user_text));
    let pick = rand::rng().random_range(0..templates.len());
    ResponseEnvelope::new(user_text, templates[pick].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_assignment_is_deterministic() {
        for _ in 0..10 {
            assert_eq!(categorize("Hello"), ResponseCategory::Greeting);
        }
    }

    #[test]
    fn greeting_wins_over_question_marker() {
        assert_eq!(categorize("hello?"), ResponseCategory::Greeting);
        assert_eq!(categorize("嗨，如何？"), ResponseCategory::Greeting);
    }

    #[test]
    fn question_markers_match() {
        assert_eq!(categorize("?"), ResponseCategory::Question);
        assert_eq!(categorize("為什麼"), ResponseCategory::Question);
        assert_eq!(categorize("tell me more, ok?"), ResponseCategory::Question);
    }

    #[test]
    fn technical_terms_match_after_questions() {
        assert_eq!(categorize("websocket demo"), ResponseCategory::Technical);
        assert_eq!(categorize("sse rules"), ResponseCategory::Technical);
        // A question about tech is still a question.
        assert_eq!(categorize("websocket demo?"), ResponseCategory::Question);
    }

    #[test]
    fn empty_and_unmatched_input_fall_through_to_default() {
        assert_eq!(categorize(""), ResponseCategory::Default);
        assert_eq!(categorize("今天天氣不錯"), ResponseCategory::Default);
    }

    #[test]
    fn selected_template_belongs_to_the_matched_category() {
        for _ in 0..20 {
            let envelope = select_response("Hello");
            assert!(
                GREETING_TEMPLATES.contains(&envelope.content.as_str()),
                "unexpected template: {}",
                envelope.content
            );
        }
    }

    #[test]
    fn empty_input_still_yields_a_response() {
        let envelope = select_response("");
        assert!(DEFAULT_TEMPLATES.contains(&envelope.content.as_str()));
        assert_eq!(envelope.usage.input_tokens, 0);
        assert!(envelope.usage.output_tokens > 0);
    }
}
