// AI-assisted matchmaking: compose a request from the form, ask the model for
// collaborators, and serve the emphasis tool while it generates.
// All model calls go through llm_client::ModelProvider.

pub mod composer;
pub mod emphasis;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
