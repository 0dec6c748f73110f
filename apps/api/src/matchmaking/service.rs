//! Matching Service — runs the matchmaking conversation with the model.
//!
//! Flow:
//! 1. Render the prompt and offer `recordMatchResult` (+ `shouldEmphasizeSkill` when a
//!    skill is to be emphasized).
//! 2. While the model asks for `shouldEmphasizeSkill`, answer it with the configured
//!    `EmphasisDecider` and continue the conversation.
//! 3. Validate the `recordMatchResult` input (or a bare JSON text answer) as `MatchResult`.
//!
//! Any provider or schema failure ends the request; there are no partial results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::llm_client::{
    strip_json_fences, CompletionRequest, ContentBlock, LlmError, Message, ModelProvider, Role,
    ToolCall,
};
use crate::matchmaking::emphasis::{EmphasisDecider, EmphasisQuery};
use crate::matchmaking::models::{MatchRequest, MatchResult};
use crate::matchmaking::prompts::{
    matchmaking_tools, render_match_prompt, MATCHMAKING_SYSTEM, RECORD_RESULT_TOOL,
    SHOULD_EMPHASIZE_TOOL,
};

/// Model turns allowed before giving up on a final answer.
pub const MAX_TOOL_ROUNDS: usize = 4;
/// User-facing message for every failed suggestion request.
pub const SUGGESTION_FAILURE_MESSAGE: &str = "Failed to get suggestions from AI. Please try again.";

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("model provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("structured output rejected: {0}")]
    Parse(String),
}

/// `{success: true, data}` or `{success: false, error}` — what the caller receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<MatchResult, MatchError>> for SuggestionEnvelope {
    fn from(outcome: Result<MatchResult, MatchError>) -> Self {
        match outcome {
            Ok(result) => SuggestionEnvelope {
                success: true,
                data: Some(result),
                error: None,
            },
            Err(_) => SuggestionEnvelope {
                success: false,
                data: None,
                error: Some(SUGGESTION_FAILURE_MESSAGE.to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmphasisToolInput {
    skill: String,
    #[serde(default)]
    project_needs: String,
}

pub struct MatchmakingService {
    provider: Arc<dyn ModelProvider>,
    decider: Arc<dyn EmphasisDecider>,
}

impl MatchmakingService {
    pub fn new(provider: Arc<dyn ModelProvider>, decider: Arc<dyn EmphasisDecider>) -> Self {
        Self { provider, decider }
    }

    pub fn decider(&self) -> &dyn EmphasisDecider {
        self.decider.as_ref()
    }

    /// Asks the model for collaborator suggestions.
    pub async fn suggest(&self, request: &MatchRequest) -> Result<MatchResult, MatchError> {
        let mut completion =
            CompletionRequest::new(MATCHMAKING_SYSTEM, render_match_prompt(request))
                .with_tools(matchmaking_tools(request.emphasize_skill.is_some()));

        for round in 1..=MAX_TOOL_ROUNDS {
            let response = self.provider.complete(&completion).await?;
            let calls = response.tool_calls();
            debug!("Matchmaking round {round}: {} tool call(s)", calls.len());

            if let Some(call) = calls.iter().find(|c| c.name == RECORD_RESULT_TOOL) {
                return parse_result(call.input.clone());
            }

            if calls.is_empty() {
                let text = response.text().ok_or_else(|| {
                    MatchError::Parse("model returned neither a tool call nor text".to_string())
                })?;
                let value: Value = serde_json::from_str(strip_json_fences(text))
                    .map_err(|e| MatchError::Parse(format!("text answer is not JSON: {e}")))?;
                return parse_result(value);
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.run_tool(call, request).await);
            }

            completion.messages.push(Message {
                role: Role::Assistant,
                content: response
                    .content
                    .iter()
                    .filter(|b| !matches!(b, ContentBlock::Unsupported))
                    .cloned()
                    .collect(),
            });
            completion.messages.push(Message {
                role: Role::User,
                content: results,
            });
        }

        Err(MatchError::Parse(format!(
            "no result after {MAX_TOOL_ROUNDS} model rounds"
        )))
    }

    /// Like `suggest`, but never fails: errors are logged and folded into the envelope.
    pub async fn suggest_envelope(&self, request: &MatchRequest) -> SuggestionEnvelope {
        let outcome = self.suggest(request).await;
        match &outcome {
            Ok(result) => info!(
                "Matchmaking produced {} suggestions",
                result.collaborator_suggestions.len()
            ),
            Err(e) => error!("Matchmaking AI flow failed: {e}"),
        }
        outcome.into()
    }

    async fn run_tool(&self, call: &ToolCall<'_>, request: &MatchRequest) -> ContentBlock {
        let tool_use_id = call.id.to_string();

        if call.name != SHOULD_EMPHASIZE_TOOL {
            warn!("Model requested unknown tool '{}'", call.name);
            return ContentBlock::ToolResult {
                tool_use_id,
                content: format!("Unknown tool '{}'", call.name),
                is_error: true,
            };
        }

        let input: EmphasisToolInput = match serde_json::from_value(call.input.clone()) {
            Ok(input) => input,
            Err(e) => {
                return ContentBlock::ToolResult {
                    tool_use_id,
                    content: format!("Invalid input for {SHOULD_EMPHASIZE_TOOL}: {e}"),
                    is_error: true,
                };
            }
        };

        let project_needs = if input.project_needs.trim().is_empty() {
            request.project_needs.as_str()
        } else {
            input.project_needs.as_str()
        };
        let profile = request.profile_summary();
        let verdict = self
            .decider
            .decide(&EmphasisQuery {
                skill: &input.skill,
                user_profile: &profile,
                project_needs,
            })
            .await;
        if let Some(cause) = verdict.degraded_cause() {
            warn!(
                "Emphasis decision for '{}' degraded, reporting fallback: {cause}",
                input.skill
            );
        }
        let report = verdict.report();
        info!(
            "Emphasis decision for '{}' ({} policy): emphasize={} degraded={}",
            input.skill,
            self.decider.policy(),
            report.should_emphasize,
            report.degraded
        );

        ContentBlock::ToolResult {
            tool_use_id,
            content: json!(report).to_string(),
            is_error: false,
        }
    }
}

fn parse_result(value: Value) -> Result<MatchResult, MatchError> {
    let result: MatchResult = serde_json::from_value(value)
        .map_err(|e| MatchError::Parse(format!("result does not match schema: {e}")))?;
    result.validate().map_err(MatchError::Parse)
}
