//! Axum route handlers for users, profile, projects and events.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::community::forms::{
    validate_event, validate_profile, validate_project, EventForm, ProfileForm, ProjectForm,
};
use crate::errors::AppError;
use crate::models::event::Event;
use crate::models::project::Project;
use crate::models::user::User;
use crate::repository::seed::CURRENT_USER_ID;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn handle_list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.list().await)
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(&id).await?))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(CURRENT_USER_ID).await?))
}

/// PUT /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<User>, AppError> {
    let (id, patch) = validate_profile(&form)?;
    let user = state.users.update(&id, patch).await?;
    info!("Updated profile for user {id}");
    Ok(Json(user))
}

/// GET /api/v1/projects
pub async fn handle_list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.projects.list().await)
}

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(form): Json<ProjectForm>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = state.projects.insert(validate_project(&form)?).await?;
    info!("Created project {} ({})", project.id, project.title);
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/events
pub async fn handle_list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.events.list().await)
}

/// POST /api/v1/events
pub async fn handle_create_event(
    State(state): State<AppState>,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.insert(validate_event(&form)?).await?;
    info!("Created event {} ({})", event.id, event.title);
    Ok((StatusCode::CREATED, Json(event)))
}
