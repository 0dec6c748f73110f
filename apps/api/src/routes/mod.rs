pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::community::handlers as community;
use crate::matchmaking::handlers as matchmaking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matchmaking API
        .route("/api/v1/matchmaking", post(matchmaking::handle_suggest))
        .route(
            "/api/v1/matchmaking/emphasis",
            post(matchmaking::handle_emphasis),
        )
        // Community API
        .route("/api/v1/users", get(community::handle_list_users))
        .route("/api/v1/users/:id", get(community::handle_get_user))
        .route(
            "/api/v1/profile",
            get(community::handle_get_profile).put(community::handle_update_profile),
        )
        .route(
            "/api/v1/projects",
            get(community::handle_list_projects).post(community::handle_create_project),
        )
        .route(
            "/api/v1/events",
            get(community::handle_list_events).post(community::handle_create_event),
        )
        .with_state(state)
}
