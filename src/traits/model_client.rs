use async_trait::async_trait;
use futures_util::stream::{ BoxStream, StreamExt };
use serde::{ Deserialize, Serialize };

use crate::errors::PatentResult;
use crate::models::common::AgentRole;

/// A single request to a language model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub role: AgentRole,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
}

/// Incremental output of a streaming model call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ModelEvent {
    Text(String),
}

impl ModelEvent {
    pub fn text(&self) -> &str {
        match self {
            ModelEvent::Text(text) => text,
        }
    }
}

/// Ordered, finite sequence of fragments. Ends when generation completes.
pub type TextStream = BoxStream<'static, PatentResult<ModelEvent>>;

/// Language model backend shared by the examiner, fact checker and planner.
///
/// Implementations must not carry conversational state between calls: every
/// request holds its full system and user prompt.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, for logging and reports
    fn model_id(&self) -> &str;

    /// Send the request and wait for the full response
    async fn complete(&self, request: &ModelRequest) -> PatentResult<String>;

    /// Send the request and receive the response as fragments
    async fn stream(&self, request: &ModelRequest) -> PatentResult<TextStream>;
}

/// Concatenate a fragment stream in delivery order, calling `on_fragment` for each one
pub async fn collect_text<F>(mut stream: TextStream, mut on_fragment: F) -> PatentResult<String>
    where F: FnMut(&str)
{
    let mut text = String::new();
    while let Some(event) = stream.next().await {
        let event = event?;
        on_fragment(event.text());
        text.push_str(event.text());
    }
    Ok(text)
}
