//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::auth::TokenService;
use crate::config::Config;
use std::sync::Arc;
use venture_lens_core::ports::{DatabaseService, IdeaAnalysisService};

/// The shared application state, created once at startup and passed to all
/// handlers. Nothing here is mutated after construction; handlers coordinate
/// only through the database.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub analyst: Arc<dyn IdeaAnalysisService>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}
