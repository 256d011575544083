mod assessment;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod ranking;
mod routes;
mod similarity;
mod state;
mod uploads;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::SingleAssessor;
use crate::config::Config;
use crate::extraction::{DocConverter, Extractor};
use crate::llm_client::{LlmClient, TextGenerator};
use crate::ranking::RankingOrchestrator;
use crate::routes::build_router;
use crate::similarity::{HttpEmbedder, SimilarityScorer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fitment API v{}", env!("CARGO_PKG_VERSION"));

    // Embedding backend (sentence-transformers behind an HTTP endpoint)
    let embedder = HttpEmbedder::new(
        config.embedding_api_url.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
    )?;
    let scorer = SimilarityScorer::new(Arc::new(embedder));
    info!(
        "Embedding client initialized (model: {}, url: {})",
        scorer.model_name(),
        config.embedding_api_url
    );

    // LLM client
    let llm_client = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_model.clone(),
        config.request_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm_client.model());
    let llm: Arc<dyn TextGenerator> = Arc::new(llm_client);

    let extractor = Extractor::new(DocConverter::new(&config.doc_converter));
    info!(
        "Extraction: doc converter '{}', PDF evidence mode {:?}, concurrency {}",
        config.doc_converter, config.pdf_evidence_mode, config.max_concurrent_extractions
    );

    // Build app state
    let state = AppState {
        ranker: Arc::new(RankingOrchestrator::new(
            extractor.clone(),
            scorer.clone(),
            llm.clone(),
            config.max_concurrent_extractions,
            config.pdf_evidence_mode,
        )),
        assessor: Arc::new(SingleAssessor::new(
            extractor,
            scorer,
            llm,
            config.pdf_evidence_mode,
        )),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
