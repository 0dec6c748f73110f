use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelProvider;
use crate::matchmaking::emphasis::build_decider;
use crate::matchmaking::service::MatchmakingService;
use crate::models::event::Event;
use crate::models::project::Project;
use crate::models::user::User;
use crate::repository::{seed, InMemoryRepository, Repository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub matchmaking: Arc<MatchmakingService>,
    pub users: Arc<dyn Repository<User>>,
    pub projects: Arc<dyn Repository<Project>>,
    pub events: Arc<dyn Repository<Event>>,
}

impl AppState {
    /// Wires the seeded repositories and the matchmaking service around a model provider.
    pub fn new(config: Config, provider: Arc<dyn ModelProvider>) -> Self {
        let decider = build_decider(config.emphasis_policy, provider.clone());
        let latency = config.mock_latency;

        Self {
            matchmaking: Arc::new(MatchmakingService::new(provider, decider)),
            users: Arc::new(InMemoryRepository::new(seed::users(), latency)),
            projects: Arc::new(InMemoryRepository::new(seed::projects(), latency)),
            events: Arc::new(InMemoryRepository::new(seed::events(), latency)),
            config,
        }
    }
}
