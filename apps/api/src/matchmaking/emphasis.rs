//! Emphasis Decision — decides whether a user-chosen skill should be foregrounded.
//!
//! One policy is active per process, picked by `EMPHASIS_POLICY`:
//! - `deterministic`: `SubstringDecider`, a case-insensitive containment check.
//! - `model`: `LlmDecider`, a low-temperature model call returning `{shouldEmphasize, reason}`.
//!
//! Deciders never fail. A decision that could not be made comes back as
//! `EmphasisVerdict::Degraded`, which still reports the fixed fallback decision.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, CompletionRequest, ModelProvider};
use crate::matchmaking::prompts::render_emphasis_decision_prompt;

pub const UNDETERMINED_REASON: &str = "AI failed to make a determination.";
const DECISION_TEMPERATURE: f32 = 0.3;
const DECISION_MAX_TOKENS: u32 = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmphasisDecision {
    pub should_emphasize: bool,
    pub reason: String,
}

impl EmphasisDecision {
    /// The decision reported when none could be made.
    pub fn undetermined() -> Self {
        Self {
            should_emphasize: false,
            reason: UNDETERMINED_REASON.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmphasisVerdict {
    Decided(EmphasisDecision),
    /// The decider could not reach a decision. `cause` is logged, never sent to callers.
    Degraded { cause: String },
}

impl EmphasisVerdict {
    pub fn decision(&self) -> EmphasisDecision {
        match self {
            EmphasisVerdict::Decided(decision) => decision.clone(),
            EmphasisVerdict::Degraded { .. } => EmphasisDecision::undetermined(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, EmphasisVerdict::Degraded { .. })
    }

    pub fn degraded_cause(&self) -> Option<&str> {
        match self {
            EmphasisVerdict::Degraded { cause } => Some(cause),
            EmphasisVerdict::Decided(_) => None,
        }
    }

    pub fn report(&self) -> EmphasisReport {
        let decision = self.decision();
        EmphasisReport {
            should_emphasize: decision.should_emphasize,
            reason: decision.reason,
            degraded: self.is_degraded(),
        }
    }
}

/// Wire form of a verdict, returned to the model as a tool result and to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmphasisReport {
    pub should_emphasize: bool,
    pub reason: String,
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EmphasisQuery<'a> {
    pub skill: &'a str,
    pub user_profile: &'a str,
    pub project_needs: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmphasisPolicy {
    #[default]
    Deterministic,
    ModelDelegated,
}

impl FromStr for EmphasisPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deterministic" | "substring" => Ok(EmphasisPolicy::Deterministic),
            "model" | "llm" => Ok(EmphasisPolicy::ModelDelegated),
            other => Err(format!(
                "unknown emphasis policy '{other}' (expected 'deterministic' or 'model')"
            )),
        }
    }
}

impl fmt::Display for EmphasisPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmphasisPolicy::Deterministic => f.write_str("deterministic"),
            EmphasisPolicy::ModelDelegated => f.write_str("model"),
        }
    }
}

/// Implement this to swap decision backends without touching the matchmaking flow.
#[async_trait]
pub trait EmphasisDecider: Send + Sync {
    fn policy(&self) -> EmphasisPolicy;
    async fn decide(&self, query: &EmphasisQuery<'_>) -> EmphasisVerdict;
}

/// True iff `skill` occurs in `project_needs`, ignoring case.
pub fn skill_mentioned(skill: &str, project_needs: &str) -> bool {
    project_needs.to_lowercase().contains(&skill.to_lowercase())
}

pub struct SubstringDecider;

#[async_trait]
impl EmphasisDecider for SubstringDecider {
    fn policy(&self) -> EmphasisPolicy {
        EmphasisPolicy::Deterministic
    }

    async fn decide(&self, query: &EmphasisQuery<'_>) -> EmphasisVerdict {
        let should_emphasize = skill_mentioned(query.skill, query.project_needs);
        let reason = if should_emphasize {
            format!("'{}' is mentioned in the project needs.", query.skill)
        } else {
            format!("'{}' is not mentioned in the project needs.", query.skill)
        };
        EmphasisVerdict::Decided(EmphasisDecision {
            should_emphasize,
            reason,
        })
    }
}

pub struct LlmDecider {
    provider: Arc<dyn ModelProvider>,
}

impl LlmDecider {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl EmphasisDecider for LlmDecider {
    fn policy(&self) -> EmphasisPolicy {
        EmphasisPolicy::ModelDelegated
    }

    async fn decide(&self, query: &EmphasisQuery<'_>) -> EmphasisVerdict {
        let prompt =
            render_emphasis_decision_prompt(query.skill, query.user_profile, query.project_needs);
        let mut request =
            CompletionRequest::new(JSON_ONLY_SYSTEM, prompt).with_temperature(DECISION_TEMPERATURE);
        request.max_tokens = DECISION_MAX_TOKENS;

        let response = match self.provider.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Emphasis decision call failed: {e}");
                return EmphasisVerdict::Degraded {
                    cause: e.to_string(),
                };
            }
        };

        let Some(text) = response.text() else {
            warn!("Emphasis decision returned no text");
            return EmphasisVerdict::Degraded {
                cause: "empty model response".to_string(),
            };
        };

        match serde_json::from_str::<EmphasisDecision>(strip_json_fences(text)) {
            Ok(decision) => EmphasisVerdict::Decided(decision),
            Err(e) => {
                warn!("Failed to parse emphasis decision, falling back: {e}; raw={text}");
                EmphasisVerdict::Degraded {
                    cause: format!("unparseable decision: {e}"),
                }
            }
        }
    }
}

pub fn build_decider(
    policy: EmphasisPolicy,
    provider: Arc<dyn ModelProvider>,
) -> Arc<dyn EmphasisDecider> {
    match policy {
        EmphasisPolicy::Deterministic => Arc::new(SubstringDecider),
        EmphasisPolicy::ModelDelegated => Arc::new(LlmDecider::new(provider)),
    }
}
