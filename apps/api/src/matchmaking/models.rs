use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Number of collaborators the model must suggest.
pub const SUGGESTION_RANGE: RangeInclusive<usize> = 3..=5;

/// A validated matchmaking request. Built by `composer::compose`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub user_skills: Vec<String>,
    pub user_interests: Vec<String>,
    pub project_needs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasize_skill: Option<String>,
}

impl MatchRequest {
    /// Profile context handed to the model-delegated emphasis decider.
    pub fn profile_summary(&self) -> String {
        format!(
            "Skills: {}. Interests: {}.",
            self.user_skills.join(", "),
            self.user_interests.join(", ")
        )
    }
}

/// Structured output of the matchmaking model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub collaborator_suggestions: Vec<String>,
    pub reasoning: String,
}

impl MatchResult {
    /// Enforces the declared output schema beyond what serde checks.
    pub fn validate(self) -> Result<Self, String> {
        let count = self.collaborator_suggestions.len();
        if !SUGGESTION_RANGE.contains(&count) {
            return Err(format!(
                "expected {}-{} collaborator suggestions, got {count}",
                SUGGESTION_RANGE.start(),
                SUGGESTION_RANGE.end()
            ));
        }
        if self
            .collaborator_suggestions
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err("collaborator suggestion names must be non-empty".to_string());
        }
        if self.reasoning.trim().is_empty() {
            return Err("reasoning must be non-empty".to_string());
        }
        Ok(self)
    }
}
