use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use receitas_api::data::memory::InMemoryStore;
use receitas_api::data::sqlite::SqliteStore;
use receitas_api::domain::repository::Store;
use receitas_api::infrastructure::config::{AppConfig, StorageBackend};
use receitas_api::infrastructure::logging::init_logging;
use receitas_api::presentation::handlers::AppState;
use receitas_api::presentation::middleware::{RequestTracing, cors};
use receitas_api::presentation::routes::configure;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_logging(&config.log_level);
    info!(?config, "Configuration loaded");

    match config.storage.clone() {
        StorageBackend::Memory => {
            warn!("Using the in-memory store; data will not survive a restart");
            serve(config, InMemoryStore::new()).await
        }
        StorageBackend::Sqlite(database_url) => {
            let store = SqliteStore::connect(&database_url)
                .await
                .with_context(|| format!("failed to open database {database_url}"))?;
            serve(config, store).await
        }
    }
}

async fn serve<R: Store>(config: AppConfig, store: R) -> Result<()> {
    let state = web::Data::new(AppState::new(Arc::new(store)));
    let cors_origins = config.cors_allowed_origins.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(RequestTracing)
            .wrap(cors(cors_origins.as_deref()))
            .configure(configure::<R>)
    });

    let (host, port) = config.bind_address();
    let server = server
        .bind((host.as_str(), port))
        .with_context(|| format!("failed to bind {host}:{port}"))?;

    info!(
        address = %format!("{host}:{port}"),
        routes = %"GET /health, POST /cadastro, POST /login, POST /favoritos, GET /favoritos/{clientId}, GET /favoritos/ids/{clientId}, GET /receitas, POST /receitas",
        "Starting HTTP server"
    );
    server.run().await?;
    Ok(())
}
