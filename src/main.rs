mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use db::{constructiondb::ConstructionExt, db::DBClient, memorydb::MemoryStore};
use dotenv::dotenv;
use routes::create_router;
use service::{construction_service::ProjectService, review_service::ReviewService};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub project_service: Arc<ProjectService>,
    pub review_service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(store: Arc<dyn ConstructionExt>) -> Self {
        AppState {
            project_service: Arc::new(ProjectService::new(store.clone())),
            review_service: Arc::new(ReviewService::new(store)),
        }
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn ConstructionExt>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL is not set; using the in-memory store (data is lost on restart)");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to the database")?;
    tracing::info!("✅ Connection to the database is successful!");

    let db_client = DBClient::new(pool);
    db_client
        .migrate()
        .await
        .context("failed to run database migrations")?;
    tracing::info!("✅ Migrations applied");

    Ok(Arc::new(db_client))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::init();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let store = connect_store(&config).await.map_err(|err| {
        tracing::error!("🔥 {:#}", err);
        err
    })?;
    tracing::info!("using the {} store", store.backend());

    let app_state = AppState::new(store);
    let app = create_router(Arc::new(app_state)).layer(cors_layer(&config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
