use crate::config::ServerConfig;
use crate::database::UserRepository;
use crate::database::sqlite::SqliteUserRepository;
use axum::{Router, middleware::from_fn, routing::get};
use http::{HeaderValue, header};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod config;
mod database;
mod domain;
mod error;
mod features;
mod middleware;


#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
}

/// Composes the health check, the users collection under `api_base_path`, and
/// the response decoration shared by every route.
pub fn build_router(state: AppState, api_base_path: &str) -> Router {
    let collections = Router::new().nest("/users", features::users::users_router());

    // axum cannot nest at the root
    let api_router = if api_base_path.is_empty() {
        collections
    } else {
        Router::new().nest(api_base_path, collections)
    };

    Router::new()
        .route("/health", get(features::health::health_handler))
        .merge(api_router)
        .with_state(state)
        .layer(from_fn(middleware::cors))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static(middleware::CONTENT_TYPE_JSON),
        ))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "users_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // missing configuration or an unusable database stops us before serving
    let config = ServerConfig::from_env()?;

    info!("connecting to database");
    let pool = database::connect_pool(&config.database_url, config.max_connections).await?;

    let app_state = AppState {
        users: Arc::new(SqliteUserRepository::new(pool)),
    };

    let app = build_router(app_state, &config.api_base_path);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        users_path = format!("{}/users", config.api_base_path),
        "server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
