use serde::{ Deserialize, Serialize };
use std::borrow::Cow;
use std::time::Duration;

/// Character budgets applied to long free text before it is embedded in a prompt.
///
/// Text beyond a budget is dropped and invisible to that step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptBudgets {
    /// Claim text given to the examiner
    pub examiner_claim_chars: usize,
    /// Patent block text given to the fact checker
    pub fact_check_block_chars: usize,
    /// Examiner reasoning given to the fact checker
    pub fact_check_reasoning_chars: usize,
    /// Patent text given to the planner
    pub planner_patent_chars: usize,
}

impl Default for PromptBudgets {
    fn default() -> Self {
        Self {
            examiner_claim_chars: 4000,
            fact_check_block_chars: 3000,
            fact_check_reasoning_chars: 2000,
            planner_patent_chars: 2000,
        }
    }
}

/// Cut `text` to at most `budget` characters. Text within budget is returned unmodified.
pub fn truncate_chars(text: &str, budget: usize) -> Cow<'_, str> {
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => Cow::Borrowed(&text[..byte_idx]),
        None => Cow::Borrowed(text),
    }
}

/// Bounded exponential backoff for recoverable model-call failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Delay before the given retry (1-based: the wait after the first failure is `backoff(1)`)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let millis = (self.initial_backoff_ms as f64) * self.multiplier.powi(exponent);
        Duration::from_millis(millis.min(self.max_backoff_ms as f64) as u64)
    }
}
