use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::info;

use fleet_api::{create_app, AppState, Config};
use shared::{FirestoreStore, ServiceAccountKey};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    info!("Starting fleet-api on {}:{}", config.host, config.port);

    let key = ServiceAccountKey::from_env()?;
    info!("Using Firestore project {}", key.project_id);
    let store = Arc::new(FirestoreStore::new(key));

    let host: IpAddr = config
        .host
        .parse()
        .context("FLEET_API_HOST must be a valid IP address")?;
    let addr = SocketAddr::from((host, config.port));

    let state = AppState {
        config,
        store,
    };
    let app = create_app(state);

    info!("fleet-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
