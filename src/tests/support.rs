use std::sync::atomic::{ AtomicU32, Ordering };
use std::sync::{ Arc, Mutex };

use async_trait::async_trait;
use futures_util::stream::{ self, StreamExt };

use crate::errors::{ PatentError, PatentResult };
use crate::implementations::agent::AgentContext;
use crate::implementations::pipeline::{ InfringementPipeline, PipelineObserver, StepOutput };
use crate::models::common::{ AgentRole, ExecutionMode, PipelineStep };
use crate::traits::{ ModelClient, ModelEvent, ModelRequest, TextStream };

type Responder = Box<dyn Fn(&ModelRequest) -> String + Send + Sync>;

/// Offline model client with canned answers per role.
///
/// The default examiner answer follows the B[5] assignment in the prompt:
/// thiophene is protected, anything else is not.
pub struct ScriptedModelClient {
    responder: Responder,
    transient_failures: AtomicU32,
    fatal_role: Option<AgentRole>,
    fragment_chars: usize,
    calls: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModelClient {
    pub fn new() -> Self {
        Self {
            responder: Box::new(default_response),
            transient_failures: AtomicU32::new(0),
            fatal_role: None,
            fragment_chars: 16,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responder<F>(mut self, responder: F) -> Self
        where F: Fn(&ModelRequest) -> String + Send + Sync + 'static
    {
        self.responder = Box::new(responder);
        self
    }

    /// Fail the next `n` calls with a network error
    pub fn failing_first(self, n: u32) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Always reject requests for `role` with HTTP 401
    pub fn failing_on(mut self, role: AgentRole) -> Self {
        self.fatal_role = Some(role);
        self
    }

    pub fn fragment_chars(mut self, n: usize) -> Self {
        self.fragment_chars = n.max(1);
        self
    }

    pub fn calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn roles(&self) -> Vec<AgentRole> {
        self.calls()
            .iter()
            .map(|r| r.role)
            .collect()
    }

    pub fn last_prompt(&self, role: AgentRole) -> Option<String> {
        self.calls()
            .into_iter()
            .rev()
            .find(|r| r.role == role)
            .map(|r| r.user_prompt)
    }

    fn respond(&self, request: &ModelRequest) -> PatentResult<String> {
        self.calls.lock().unwrap().push(request.clone());

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PatentError::NetworkError("connection reset".to_string()));
        }
        if self.fatal_role == Some(request.role) {
            return Err(PatentError::HttpError { status: 401, message: "invalid x-api-key".to_string() });
        }
        Ok((self.responder)(request))
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ModelRequest) -> PatentResult<String> {
        self.respond(request)
    }

    async fn stream(&self, request: &ModelRequest) -> PatentResult<TextStream> {
        let text = self.respond(request)?;
        let chars: Vec<char> = text.chars().collect();
        let fragments: Vec<PatentResult<ModelEvent>> = chars
            .chunks(self.fragment_chars)
            .map(|chunk| Ok(ModelEvent::Text(chunk.iter().collect())))
            .collect();
        Ok(stream::iter(fragments).boxed())
    }
}

pub fn default_response(request: &ModelRequest) -> String {
    match request.role {
        AgentRole::Examiner => {
            if request.user_prompt.contains("B[5]: `c1cccs1`") {
                "## Analysis\n\n- B[5]: thiophene satisfies \"optionally substituted thiophenyl\".\n\nVERDICT: PROTECTED".to_string()
            } else {
                "## Analysis\n\n- B[5]: the ring contains no sulfur, so it is not a thiophenyl.\n\nVERDICT: NOT_PROTECTED".to_string()
            }
        }
        AgentRole::FactChecker =>
            "## Verification\n\n- Claim 1 defines B5 as optionally substituted thiophenyl. Confirmed.".to_string(),
        AgentRole::Planner =>
            "# Infringement Report\n\nThe query molecule was compared against Formula IX.".to_string(),
    }
}

pub fn pipeline(client: &Arc<ScriptedModelClient>, mode: ExecutionMode) -> InfringementPipeline {
    InfringementPipeline::new(AgentContext::new(client.clone()), mode)
}

/// Records every observer callback as a short string
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<String>,
    pub fragments: Vec<(PipelineStep, String)>,
}

impl RecordingObserver {
    pub fn started(&self) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| e.starts_with("start:"))
            .cloned()
            .collect()
    }

    pub fn streamed_text(&self, step: PipelineStep) -> String {
        self.fragments
            .iter()
            .filter(|(s, _)| *s == step)
            .map(|(_, f)| f.as_str())
            .collect()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_step_started(&mut self, step: PipelineStep) {
        self.events.push(format!("start:{}", step.number()));
    }

    fn on_fragment(&mut self, step: PipelineStep, fragment: &str) {
        self.fragments.push((step, fragment.to_string()));
    }

    fn on_step_completed(&mut self, step: PipelineStep, _output: StepOutput<'_>) {
        self.events.push(format!("done:{}", step.number()));
    }
}
