use std::sync::Arc;

use axum::{Extension, Router};
use deadpool::managed::Pool;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use tower_http::services::ServeDir;

pub mod api;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod schema;
pub mod seed;
pub mod store;
pub mod validation;
pub mod workflow;

use auth::Keys;
use coordinator::Coordinator;
use store::Db;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn connect_to_db(db_url: &str) -> anyhow::Result<DbPool> {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Ok(Pool::builder(db_config).build()?)
}

/// The full HTTP surface over `store`. Club images are served from `assets_dir`.
pub fn app(store: Db, keys: Arc<Keys>, assets_dir: &str) -> Router {
    Router::new()
        .merge(api::app())
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(Extension(Coordinator::new(store)))
        .layer(Extension(keys))
}
