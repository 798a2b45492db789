//! Krishi Mitra - Backend Server

use std::{net::SocketAddr, sync::Arc};

use krishi_mitra::{
    config::Config,
    create_app,
    services::{
        load_catalog, Classifier, ForestClassifier, GeminiAdvisoryComposer, HttpEnvironmentalGateway,
        NominatimRegionResolver, RankedPredictor, RecommendationService,
    },
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "krishi_mitra=debug,krishi_mitra_server=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Krishi Mitra Server");
    tracing::info!("Environment: {}", config.environment);

    // Load the classifier and regional catalog
    tracing::info!("Loading model from {}", config.model.path);
    let classifier = ForestClassifier::from_path(&config.model.path)?;
    tracing::info!(
        "Model loaded: {} trees, {} crops",
        classifier.n_trees(),
        classifier.labels().len()
    );
    let catalog = load_catalog(config.catalog.path.as_deref())?;
    tracing::info!("Catalog covers {} regions", catalog.len());

    // Wire the pipeline
    let recommendations = RecommendationService::new(
        Arc::new(HttpEnvironmentalGateway::new(&config)?),
        Arc::new(NominatimRegionResolver::new(&config.geocoding)?),
        RankedPredictor::new(Arc::new(classifier)),
        Arc::new(catalog),
        Arc::new(GeminiAdvisoryComposer::new(&config.advisory)?),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        recommendations: Arc::new(recommendations),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
