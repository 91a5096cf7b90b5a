mod archive;
mod config;
mod db;
mod error;
mod markdown;
mod models;
mod params;
mod routes;
#[cfg(test)]
mod test_helpers;

use crate::config::AppConfig;
use axum::extract::FromRef;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: AppConfig,
}

impl FromRef<AppState> for sqlx::SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = AppConfig::load().expect("Failed to load configuration");

    let pool = db::setup_database(&settings).await?;
    let state = AppState {
        db: pool,
        config: settings.clone(),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("listening on {}", settings.server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
