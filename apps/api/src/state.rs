use std::sync::Arc;

use crate::assessment::SingleAssessor;
use crate::config::Config;
use crate::ranking::RankingOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub ranker: Arc<RankingOrchestrator>,
    pub assessor: Arc<SingleAssessor>,
}
