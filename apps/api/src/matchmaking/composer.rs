//! Request Composer — turns raw matchmaking form fields into a validated `MatchRequest`.

use serde::Deserialize;

use crate::forms::{optional_text, split_list, FieldError, FieldErrors};
use crate::matchmaking::models::MatchRequest;

const MIN_NEEDS_LEN: usize = 10;

/// Raw form submission, exactly as typed by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingForm {
    #[serde(default)]
    pub user_skills: String,
    #[serde(default)]
    pub user_interests: String,
    #[serde(default)]
    pub project_needs: String,
    #[serde(default)]
    pub emphasize_skill: Option<String>,
}

/// Validates the form and splits the list fields.
///
/// Every failing field is reported; no partial request is ever produced.
pub fn compose(form: &MatchmakingForm) -> Result<MatchRequest, Vec<FieldError>> {
    let mut errors = FieldErrors::new();

    let user_skills = split_list(&form.user_skills);
    if user_skills.is_empty() {
        errors.push("userSkills", "Please list your skills.");
    }

    let user_interests = split_list(&form.user_interests);
    if user_interests.is_empty() {
        errors.push("userInterests", "Please list your interests.");
    }

    errors.require_min_len(
        "projectNeeds",
        &form.project_needs,
        MIN_NEEDS_LEN,
        "Please describe your project needs in more detail.",
    );

    errors.finish(MatchRequest {
        user_skills,
        user_interests,
        project_needs: form.project_needs.trim().to_string(),
        emphasize_skill: optional_text(form.emphasize_skill.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(
        skills: &str,
        interests: &str,
        needs: &str,
        emphasize: Option<&str>,
    ) -> MatchmakingForm {
        MatchmakingForm {
            user_skills: skills.to_string(),
            user_interests: interests.to_string(),
            project_needs: needs.to_string(),
            emphasize_skill: emphasize.map(str::to_string),
        }
    }

    #[test]
    fn test_compose_splits_and_trims_lists() {
        let request = compose(&form(
            "React, Figma",
            " AI ,Web3",
            "Need a React developer familiar with Figma",
            Some("Figma"),
        ))
        .unwrap();

        assert_eq!(request.user_skills, vec!["React", "Figma"]);
        assert_eq!(request.user_interests, vec!["AI", "Web3"]);
        assert_eq!(request.emphasize_skill.as_deref(), Some("Figma"));
    }

    #[test]
    fn test_blank_emphasis_is_absent() {
        let request =
            compose(&form("React", "Design", "Need a React developer", Some("  "))).unwrap();
        assert_eq!(request.emphasize_skill, None);
    }

    #[test]
    fn test_separator_only_skills_are_rejected() {
        let err = compose(&form(",,, ,", "AI and ML", "Need a React developer", None)).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].field, "userSkills");
    }

    #[test]
    fn test_all_failing_fields_are_reported() {
        let err = compose(&form("", " , ", "short", None)).unwrap_err();
        let fields: Vec<&str> = err.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["userSkills", "userInterests", "projectNeeds"]);
        assert_eq!(err[2].message, "Please describe your project needs in more detail.");
    }

    #[test]
    fn test_single_short_token_is_accepted() {
        let request = compose(&form(
            "UI/UX Design, React, Figma",
            "AI",
            "Need a React developer familiar with Figma",
            None,
        ))
        .unwrap();
        assert_eq!(request.user_interests, vec!["AI"]);

        let request = compose(&form("Go", "ML", "Backend for a data pipeline", None)).unwrap();
        assert_eq!(request.user_skills, vec!["Go"]);
    }

    #[test]
    fn test_form_deserializes_from_camel_case_json() {
        let parsed: MatchmakingForm = serde_json::from_str(
            r#"{"userSkills": "Rust", "userInterests": "Systems", "projectNeeds": "A fast matching engine"}"#,
        )
        .unwrap();
        assert_eq!(parsed.user_skills, "Rust");
        assert!(parsed.emphasize_skill.is_none());
    }
}
