//! Axum route handlers for the Matchmaking API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::forms::{optional_text, FieldErrors};
use crate::matchmaking::composer::{compose, MatchmakingForm};
use crate::matchmaking::emphasis::{EmphasisQuery, EmphasisReport};
use crate::matchmaking::service::SuggestionEnvelope;
use crate::repository::seed::CURRENT_USER_ID;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmphasisRequest {
    #[serde(default)]
    pub skill: String,
    /// Defaults to the current user's profile when omitted.
    #[serde(default)]
    pub user_profile: Option<String>,
    #[serde(default)]
    pub project_needs: String,
}

/// POST /api/v1/matchmaking
///
/// Invalid forms are rejected before any model call. Model failures come back as
/// `{success: false, error}` with 502; they never surface as an error body.
pub async fn handle_suggest(
    State(state): State<AppState>,
    Json(form): Json<MatchmakingForm>,
) -> Result<(StatusCode, Json<SuggestionEnvelope>), AppError> {
    let request = compose(&form)?;
    let envelope = state.matchmaking.suggest_envelope(&request).await;
    let status = if envelope.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(envelope)))
}

/// POST /api/v1/matchmaking/emphasis
///
/// Runs the configured emphasis decider on its own.
pub async fn handle_emphasis(
    State(state): State<AppState>,
    Json(req): Json<EmphasisRequest>,
) -> Result<Json<EmphasisReport>, AppError> {
    let mut errors = FieldErrors::new();
    errors.require_min_len("skill", &req.skill, 1, "Skill is required.");
    errors.require_min_len(
        "projectNeeds",
        &req.project_needs,
        1,
        "Project needs are required.",
    );
    errors.finish(())?;

    let user_profile = match optional_text(req.user_profile.as_deref()) {
        Some(profile) => profile,
        None => state.users.get(CURRENT_USER_ID).await?.profile_summary(),
    };

    let verdict = state
        .matchmaking
        .decider()
        .decide(&EmphasisQuery {
            skill: req.skill.trim(),
            user_profile: &user_profile,
            project_needs: &req.project_needs,
        })
        .await;
    if let Some(cause) = verdict.degraded_cause() {
        warn!("Standalone emphasis decision degraded: {cause}");
    }

    Ok(Json(verdict.report()))
}
