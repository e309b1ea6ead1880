use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use puv_api::{app, state::{AppState, AuthConfig}};
use puv_core::location::StaticLocationProvider;
use puv_core::repository::{build_catalog, CatalogSource};
use puv_store::{FileCatalogSource, InMemoryAuthProvider, StaticCatalogSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puv_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = puv_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting PUV API on port {}", config.server.port);

    // Catalog seed: configured file, else the bundled data set
    let source: Box<dyn CatalogSource> = match &config.catalog.data_path {
        Some(path) => Box::new(FileCatalogSource::new(path)),
        None => Box::new(StaticCatalogSource),
    };
    let catalog = build_catalog(source.as_ref(), config.catalog.settings())
        .await
        .context("Failed to build trip catalog")?;

    let app_state = AppState {
        catalog: Arc::new(catalog),
        auth_provider: Arc::new(InMemoryAuthProvider::new(config.auth.bcrypt_cost)),
        location: Arc::new(StaticLocationProvider::new(config.location.position())),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await?;

    Ok(())
}
