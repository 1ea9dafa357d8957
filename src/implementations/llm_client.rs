use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{ self, BoxStream, StreamExt };
use log::{ debug, info, warn };
use serde::{ Deserialize, Serialize };

use crate::errors::{ PatentError, PatentResult };
use crate::implementations::config::{ ClientConfig, Provider };
use crate::implementations::sse::{ decode_anthropic, decode_openai, SseDecoder, SseEvent, StreamItem };
use crate::traits::{ ModelClient, ModelEvent, ModelRequest, TextStream };

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Anthropic Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")] Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// OpenAI-compatible chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP model client for the Anthropic Messages API or an OpenAI-compatible endpoint.
///
/// # API Keys
/// The key comes from `llm_api.api_key` in the config file, or from the
/// provider's environment variable:
///    - Anthropic: ANTHROPIC_API_KEY
///    - OpenAI: OPENAI_API_KEY
///
/// Holds no conversational state: every request is self-contained, so one
/// client can be shared by all agents.
#[derive(Clone)]
pub struct LlmClient {
    config: ClientConfig,
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(config: ClientConfig) -> PatentResult<Self> {
        let api_key = config.get_api_key()?;
        // Connect timeout only. Call and fragment deadlines live in RetryingModelClient.
        let http_client = reqwest::Client
            ::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PatentError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        let endpoint = config.endpoint();

        info!("Using {:?} provider at {} with model {}", config.llm_api.provider, endpoint, config.llm_api.model);
        Ok(Self { config, http_client, api_key, endpoint })
    }

    pub fn provider(&self) -> Provider {
        self.config.llm_api.provider
    }

    fn build_request(&self, request: &ModelRequest, stream: bool) -> PatentResult<reqwest::RequestBuilder> {
        let model = self.config.llm_api.model.as_str();
        let max_tokens = self.config.max_tokens;
        let user = ChatMessage { role: "user".to_string(), content: request.user_prompt.clone() };

        debug!("API endpoint: {}", self.endpoint);
        debug!("Model: {}", model);
        debug!("Temperature: {}", request.temperature);
        debug!("Max tokens: {}", max_tokens);

        let builder = self.http_client.post(&self.endpoint).header("Content-Type", "application/json");
        let builder = match self.provider() {
            Provider::Anthropic => {
                let body = MessagesRequest {
                    model,
                    max_tokens,
                    temperature: request.temperature,
                    system: &request.system_prompt,
                    messages: vec![user],
                    stream,
                };
                builder
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .body(serde_json::to_vec(&body)?)
            }
            Provider::OpenAi => {
                let body = ChatRequest {
                    model,
                    messages: vec![
                        ChatMessage {
                            role: "system".to_string(),
                            content: request.system_prompt.clone(),
                        },
                        user
                    ],
                    temperature: request.temperature,
                    max_tokens,
                    stream: if stream { Some(true) } else { None },
                };
                builder
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .body(serde_json::to_vec(&body)?)
            }
        };
        Ok(builder)
    }

    async fn send(&self, request: &ModelRequest, stream: bool) -> PatentResult<reqwest::Response> {
        info!("Making {} request for {}", if stream { "streaming" } else { "blocking" }, request.role);
        let response = self
            .build_request(request, stream)?
            .send().await
            .map_err(|e| {
                let error_msg = format!("Network error when calling model API: {}", e);
                warn!("{}", error_msg);
                if e.is_connect() {
                    warn!("Connection error - check network connectivity");
                }
                PatentError::NetworkError(error_msg)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text().await
                .unwrap_or_else(|_| "Failed to get error message".to_string());
            warn!("API error: HTTP {} - {}", status, error_text);
            return Err(PatentError::HttpError { status, message: error_text });
        }
        Ok(response)
    }
}

/// Pull the response text out of a blocking response body
pub(crate) fn parse_completion(provider: Provider, body: &str) -> PatentResult<String> {
    match provider {
        Provider::Anthropic => {
            let response: MessagesResponse = serde_json
                ::from_str(body)
                .map_err(|e| PatentError::ParseError(format!("Invalid Anthropic response: {}", e)))?;
            let text: String = response.content
                .into_iter()
                .filter_map(|block| {
                    match block {
                        ContentBlock::Text { text } => Some(text),
                        ContentBlock::Other => None,
                    }
                })
                .collect();
            if text.is_empty() {
                return Err(PatentError::ParseError("No text content in Anthropic response".to_string()));
            }
            Ok(text)
        }
        Provider::OpenAi => {
            let response: ChatResponse = serde_json
                ::from_str(body)
                .map_err(|e| PatentError::ParseError(format!("Invalid chat completion response: {}", e)))?;
            response.choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| PatentError::ParseError("No choices in chat completion response".to_string()))
        }
    }
}

fn decode_event(provider: Provider, event: &SseEvent) -> PatentResult<StreamItem> {
    match provider {
        Provider::Anthropic => decode_anthropic(event),
        Provider::OpenAi => decode_openai(event),
    }
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<SseEvent>,
    provider: Provider,
    body_done: bool,
    finished: bool,
}

/// Turn a streaming response body into text fragments
fn fragment_stream(provider: Provider, response: reqwest::Response) -> TextStream {
    let body = response
        .bytes_stream()
        .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
        .boxed();
    decode_body(provider, body)
}

/// Decode raw SSE body chunks. Ends at the provider's stop event or the first error.
pub(crate) fn decode_body(
    provider: Provider,
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>
) -> TextStream {
    let state = SseState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        provider,
        body_done: false,
        finished: false,
    };

    stream
        ::unfold(state, |mut state| async move {
            loop {
                if state.finished {
                    return None;
                }
                if let Some(event) = state.pending.pop_front() {
                    match decode_event(state.provider, &event) {
                        Ok(StreamItem::Text(text)) => {
                            return Some((Ok(ModelEvent::Text(text)), state));
                        }
                        Ok(StreamItem::Done) => {
                            return None;
                        }
                        Ok(StreamItem::Ignore) => {
                            continue;
                        }
                        Err(e) => {
                            state.finished = true;
                            return Some((Err(e), state));
                        }
                    }
                }
                if state.body_done {
                    return None;
                }
                match state.body.next().await {
                    Some(Ok(chunk)) => {
                        let events = state.decoder.push(&chunk);
                        state.pending.extend(events);
                    }
                    Some(Err(e)) => {
                        state.finished = true;
                        let err = PatentError::NetworkError(format!("Stream interrupted: {}", e));
                        return Some((Err(err), state));
                    }
                    None => {
                        state.body_done = true;
                        let events = state.decoder.finish();
                        state.pending.extend(events);
                    }
                }
            }
        })
        .boxed()
}

#[async_trait]
impl ModelClient for LlmClient {
    fn model_id(&self) -> &str {
        &self.config.llm_api.model
    }

    async fn complete(&self, request: &ModelRequest) -> PatentResult<String> {
        let response = self.send(request, false).await?;
        let body = response
            .text().await
            .map_err(|e| PatentError::NetworkError(format!("Failed to read response body: {}", e)))?;
        debug!("Response length: {} characters", body.len());
        let content = parse_completion(self.provider(), &body)?;
        info!("API call completed successfully");
        Ok(content)
    }

    async fn stream(&self, request: &ModelRequest) -> PatentResult<TextStream> {
        let response = self.send(request, true).await?;
        debug!("Streaming response opened");
        Ok(fragment_stream(self.provider(), response))
    }
}
