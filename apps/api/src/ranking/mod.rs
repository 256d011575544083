pub mod formatter;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod schema;
pub mod validation;

pub use orchestrator::RankingOrchestrator;
