use medrisk::{
    api::{build_router, AppState},
    config::Config,
    feedback::FeedbackAnalyzer,
    ml::RiskEngine,
    state::InMemoryStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    tracing::info!(
        service = %config.observability.service_name,
        "Starting MedRisk v{}",
        env!("CARGO_PKG_VERSION")
    );

    // The model and its baseline must be ready before any request is accepted
    let engine = match RiskEngine::from_config(&config.model) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!(path = %config.model.path.display(), "Failed to load model: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("✅ Risk engine initialized");

    let analyzer = Arc::new(FeedbackAnalyzer::default());
    tracing::info!("✅ Feedback analyzer initialized");

    let store = Arc::new(InMemoryStore::new());
    tracing::info!("✅ In-memory store initialized");

    let app_state = AppState::new(engine, analyzer, store)
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Assessments: http://{}/api/assessment", http_addr);
    tracing::info!("   Feedback: http://{}/submit_feedback", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "medrisk={level},tower_http={level}",
            level = config.observability.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
