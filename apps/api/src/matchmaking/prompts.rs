// All LLM prompt constants and tool declarations for the Matchmaking module.

use serde_json::{json, Value};

use crate::llm_client::prompts::fill_template;
use crate::llm_client::ToolDefinition;
use crate::matchmaking::models::{MatchRequest, SUGGESTION_RANGE};

/// Tool the model calls to check whether a skill matters to the project.
pub const SHOULD_EMPHASIZE_TOOL: &str = "shouldEmphasizeSkill";
/// Tool the model calls once with its final structured answer.
pub const RECORD_RESULT_TOOL: &str = "recordMatchResult";

pub const MATCHMAKING_SYSTEM: &str = "You are an AI-powered matchmaking engine for a student \
    project platform called NexusConnect. You suggest plausible-sounding, fictional student \
    collaborators. You deliver your final answer ONLY by calling the recordMatchResult tool.";

/// Replace: {user_skills}, {user_interests}, {project_needs}, {emphasis_step}
pub const MATCHMAKING_PROMPT_TEMPLATE: &str = "User Skills: {user_skills}
User Interests: {user_interests}
Project Needs: {project_needs}

Instructions:
1. Analyze the user's skills, interests, and the project needs.
2. Identify 3-5 plausible-sounding, fictional student names as potential collaborators. These collaborators should have skills and interests relevant to the project.
3. Explain your reasoning for suggesting these collaborators in a friendly and helpful tone.
{emphasis_step}
Your entire response must be a single call to the recordMatchResult tool, matching its input schema exactly.";

/// Replace: {skill}
pub const EMPHASIS_STEP_TEMPLATE: &str = "4. The user wants to emphasize the skill: '{skill}'. \
Use the 'shouldEmphasizeSkill' tool to check if this skill is relevant to the project needs. \
If the tool returns shouldEmphasize=true, make sure your suggestions strongly reflect this by \
suggesting collaborators who are experts in '{skill}' and mention this in your reasoning.
";

/// Model-delegated emphasis decision. Replace: {user_profile}, {project_needs}, {skill}
pub const EMPHASIS_DECISION_PROMPT_TEMPLATE: &str = r#"Given the user profile: {user_profile}
and the project needs: {project_needs}
determine if the skill: {skill} should be emphasized when suggesting collaborators.

Return a JSON object with this EXACT schema (no extra fields):
{
  "shouldEmphasize": true,
  "reason": "One sentence explaining why or why not the skill should be emphasized."
}"#;

/// Renders the matchmaking prompt. The emphasis step is present only when a skill is set.
pub fn render_match_prompt(request: &MatchRequest) -> String {
    let emphasis_step = request
        .emphasize_skill
        .as_deref()
        .map(|skill| fill_template(EMPHASIS_STEP_TEMPLATE, &[("skill", skill)]))
        .unwrap_or_default();

    fill_template(
        MATCHMAKING_PROMPT_TEMPLATE,
        &[
            ("user_skills", &request.user_skills.join(", ")),
            ("user_interests", &request.user_interests.join(", ")),
            ("project_needs", &request.project_needs),
            ("emphasis_step", &emphasis_step),
        ],
    )
}

pub fn render_emphasis_decision_prompt(
    skill: &str,
    user_profile: &str,
    project_needs: &str,
) -> String {
    fill_template(
        EMPHASIS_DECISION_PROMPT_TEMPLATE,
        &[
            ("user_profile", user_profile),
            ("project_needs", project_needs),
            ("skill", skill),
        ],
    )
}

/// Input schema of `recordMatchResult`, i.e. the declared `MatchResult` output schema.
pub fn match_result_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collaboratorSuggestions": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": SUGGESTION_RANGE.start(),
                "maxItems": SUGGESTION_RANGE.end(),
                "description": "List of 3-5 plausible-sounding, fictional student names as potential collaborators."
            },
            "reasoning": {
                "type": "string",
                "description": "Explanation of why these collaborators were suggested."
            }
        },
        "required": ["collaboratorSuggestions", "reasoning"],
        "additionalProperties": false
    })
}

/// Tools offered to the model. The emphasis tool is only offered when it is needed.
pub fn matchmaking_tools(with_emphasis: bool) -> Vec<ToolDefinition> {
    let mut tools = vec![ToolDefinition {
        name: RECORD_RESULT_TOOL.to_string(),
        description: "Record the final collaborator suggestions and the reasoning behind them."
            .to_string(),
        input_schema: match_result_schema(),
    }];

    if with_emphasis {
        tools.push(ToolDefinition {
            name: SHOULD_EMPHASIZE_TOOL.to_string(),
            description: "Determines if a specific skill is relevant to the project needs and \
                should be emphasized when suggesting collaborators."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "skill": { "type": "string", "description": "The skill to consider." },
                    "projectNeeds": { "type": "string", "description": "The project needs description." }
                },
                "required": ["skill", "projectNeeds"]
            }),
        });
    }

    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(emphasize: Option<&str>) -> MatchRequest {
        MatchRequest {
            user_skills: vec!["React".to_string(), "Figma".to_string()],
            user_interests: vec!["AI".to_string(), "Web3".to_string()],
            project_needs: "Need a React developer familiar with Figma".to_string(),
            emphasize_skill: emphasize.map(str::to_string),
        }
    }

    #[test]
    fn test_prompt_lists_skills_and_interests_once_in_order() {
        let prompt = render_match_prompt(&request(Some("Figma")));
        assert_eq!(prompt.matches("User Skills: React, Figma\n").count(), 1);
        assert_eq!(prompt.matches("User Interests: AI, Web3\n").count(), 1);
        assert!(prompt.contains("Project Needs: Need a React developer familiar with Figma"));
    }

    #[test]
    fn test_prompt_without_emphasis_has_no_fourth_step() {
        let prompt = render_match_prompt(&request(None));
        assert!(!prompt.contains("4. "));
        assert!(!prompt.contains(SHOULD_EMPHASIZE_TOOL));
        assert!(!prompt.contains("{emphasis_step}"));
    }

    #[test]
    fn test_prompt_with_emphasis_names_skill_and_tool() {
        let prompt = render_match_prompt(&request(Some("Figma")));
        assert!(prompt.contains("4. The user wants to emphasize the skill: 'Figma'"));
        assert!(prompt.contains(SHOULD_EMPHASIZE_TOOL));
        assert!(prompt.contains("experts in 'Figma'"));
    }

    #[test]
    fn test_placeholder_text_in_user_input_is_not_expanded() {
        let mut req = request(None);
        req.user_skills = vec!["{project_needs}".to_string()];
        let prompt = render_match_prompt(&req);
        assert!(prompt.contains("User Skills: {project_needs}\n"));
    }

    #[test]
    fn test_emphasis_tool_offered_only_when_requested() {
        let names = |tools: Vec<ToolDefinition>| -> Vec<String> {
            tools.into_iter().map(|t| t.name).collect()
        };
        assert_eq!(names(matchmaking_tools(false)), vec![RECORD_RESULT_TOOL]);
        assert_eq!(
            names(matchmaking_tools(true)),
            vec![RECORD_RESULT_TOOL, SHOULD_EMPHASIZE_TOOL]
        );
    }

    #[test]
    fn test_result_schema_bounds_suggestion_count() {
        let schema = match_result_schema();
        let suggestions = &schema["properties"]["collaboratorSuggestions"];
        assert_eq!(suggestions["minItems"], 3);
        assert_eq!(suggestions["maxItems"], 5);
    }

    #[test]
    fn test_decision_prompt_embeds_all_inputs() {
        let prompt =
            render_emphasis_decision_prompt("Figma", "Skills: React", "Need Figma designs");
        assert!(prompt.contains("the skill: Figma"));
        assert!(prompt.contains("Skills: React"));
        assert!(prompt.contains("Need Figma designs"));
        assert!(prompt.contains("\"shouldEmphasize\""));
    }
}
