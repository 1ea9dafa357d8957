//! Server-Sent Events framing and the per-provider payloads carried inside it.

use serde::Deserialize;

use crate::errors::{ PatentError, PatentResult };

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

/// Incremental SSE parser. Feed it raw body chunks in arrival order.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every event it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block[..end])) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event the server did not terminate with a blank line
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_block(&String::from_utf8_lossy(&rest)).into_iter().collect()
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = SseEvent::default();
    let mut data_lines = Vec::new();
    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => {
                event.event = Some(value.to_string());
            }
            "data" => data_lines.push(value),
            _ => {}
        }
    }
    if data_lines.is_empty() && event.event.is_none() {
        return None;
    }
    event.data = data_lines.join("\n");
    Some(event)
}

/// What a decoded event means for the fragment stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    Text(String),
    Done,
    Ignore,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicStreamEvent {
    #[serde(rename = "content_block_delta")] ContentBlockDelta {
        delta: AnthropicDelta,
    },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(rename = "error")] Error {
        error: AnthropicErrorBody,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicDelta {
    #[serde(rename = "text_delta")] TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChunk {
    #[serde(default)]
    choices: Vec<OpenAiChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChunkChoice {
    #[serde(default)]
    delta: OpenAiDelta,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Anthropic Messages API stream: text arrives in `content_block_delta` events
pub fn decode_anthropic(event: &SseEvent) -> PatentResult<StreamItem> {
    if event.data.trim().is_empty() {
        return Ok(StreamItem::Ignore);
    }
    let parsed: AnthropicStreamEvent = serde_json
        ::from_str(&event.data)
        .map_err(|e| PatentError::ParseError(format!("Bad Anthropic stream event: {}", e)))?;
    match parsed {
        AnthropicStreamEvent::ContentBlockDelta { delta: AnthropicDelta::TextDelta { text } } => {
            if text.is_empty() { Ok(StreamItem::Ignore) } else { Ok(StreamItem::Text(text)) }
        }
        AnthropicStreamEvent::MessageStop => Ok(StreamItem::Done),
        AnthropicStreamEvent::Error { error } =>
            Err(PatentError::ModelError(format!("{}: {}", error.kind, error.message))),
        _ => Ok(StreamItem::Ignore),
    }
}

/// OpenAI-compatible stream: `choices[0].delta.content`, terminated by `[DONE]`
pub fn decode_openai(event: &SseEvent) -> PatentResult<StreamItem> {
    let data = event.data.trim();
    if data.is_empty() {
        return Ok(StreamItem::Ignore);
    }
    if data == "[DONE]" {
        return Ok(StreamItem::Done);
    }
    let chunk: OpenAiChunk = serde_json
        ::from_str(data)
        .map_err(|e| PatentError::ParseError(format!("Bad OpenAI stream chunk: {}", e)))?;
    let text = chunk.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();
    if text.is_empty() {
        Ok(StreamItem::Ignore)
    } else {
        Ok(StreamItem::Text(text))
    }
}
