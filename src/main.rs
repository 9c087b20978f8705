use std::sync::Arc;

use axum::http::Method;
use campus_clubs::{
    auth::Keys,
    config::Config,
    connect_to_db, seed,
    store::{Db, MemoryStore, PgStore},
};
use envconfig::Envconfig;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("campus_clubs=info,tower_http=info")),
        )
        .init();

    let config = Config::init_from_env()?;

    let store: Db = match &config.db_url {
        Some(url) => Arc::new(PgStore::new(connect_to_db(url)?)),
        None => {
            warn!("DATABASE_URL is not set, data will not outlive this process");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed_clubs {
        seed::seed_clubs(store.as_ref()).await?;
    }
    match &config.admin_password {
        Some(password) => {
            seed::ensure_admin(store.as_ref(), &config.admin_username, password).await?;
        }
        None => warn!("ADMIN_PASSWORD is not set, no admin account was provisioned"),
    }

    let keys = Arc::new(Keys::new(&config.jwt_secret, config.token_ttl()));
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = campus_clubs::app(store, keys, &config.assets_dir)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
