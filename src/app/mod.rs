use axum::Router;
use sqlx::SqlitePool;

/// Human-readable application name, used in startup logs.
pub const APP_NAME: &str = "Dealdeck";

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: config::Config,
}

/// All API routes. Merged into the top-level router in lib.rs.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(features::auth::routes())
        .merge(features::users::routes())
        .merge(features::organizations::routes())
        .merge(features::staff::routes())
        .merge(features::tasks::routes())
        .merge(features::contracts::routes())
        .merge(features::deals::routes())
        .merge(features::guests::routes())
}

pub mod access;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod session;
