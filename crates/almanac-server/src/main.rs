mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use almanac_api::routes;
use almanac_api::state::{AppState, AppStateInner, SessionConfig};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "almanac=debug,almanac_api=debug,almanac_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let db = almanac_db::Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        session: SessionConfig {
            secret: config.session_secret.clone(),
            ttl_days: config.session_days,
            secure_cookies: config.secure_cookies,
        },
        downloads_dir: config.downloads_dir.clone(),
    });

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Almanac listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
