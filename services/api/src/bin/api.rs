//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, DisabledEnhancement, OpenRouterEnhancementAdapter},
    config::Config,
    error::ApiError,
    web::{router, state::AppState, ApiDoc},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use packing_list_core::{
    catalog::CatalogService,
    localization::TextCatalog,
    memory::{InMemoryCatalogStorage, InMemoryReminderStore, InMemoryTripHistory},
    ports::{CatalogStorage, EnhancementService, ReminderExporter, TripHistory},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage ---
    let (catalog_storage, history, reminders): (
        Arc<dyn CatalogStorage>,
        Arc<dyn TripHistory>,
        Arc<dyn ReminderExporter>,
    ) = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool, config.reminders_enabled));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            (
                db_adapter.clone() as Arc<dyn CatalogStorage>,
                db_adapter.clone() as Arc<dyn TripHistory>,
                db_adapter as Arc<dyn ReminderExporter>,
            )
        }
        None => {
            warn!("DATABASE_URL is not set. Catalog and history are kept in memory.");
            (
                Arc::new(InMemoryCatalogStorage::default()) as Arc<dyn CatalogStorage>,
                Arc::new(InMemoryTripHistory::default()) as Arc<dyn TripHistory>,
                Arc::new(InMemoryReminderStore::new(config.reminders_enabled))
                    as Arc<dyn ReminderExporter>,
            )
        }
    };

    // --- 3. Initialize Service Adapters ---
    let enhancement: Arc<dyn EnhancementService> = match &config.openrouter_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(&config.openrouter_base_url);
            info!(model = %config.enhancement_model, "Enhancement enabled");
            Arc::new(OpenRouterEnhancementAdapter::new(
                Client::with_config(openai_config),
                config.enhancement_model.clone(),
                config.enhancement_timeout,
            ))
        }
        None => {
            warn!("OPENROUTER_API_KEY is not set. Enhancement requests will return the base list.");
            Arc::new(DisabledEnhancement)
        }
    };

    let catalog = Arc::new(CatalogService::new(catalog_storage)?);
    let items = catalog.load_all().await?;
    info!(items = items.len(), "Item catalog ready");

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        history,
        enhancement,
        reminders,
        texts: Arc::new(TextCatalog::embedded()?),
        history_edits: Arc::default(),
    });

    // --- 5. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = router(app_state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
