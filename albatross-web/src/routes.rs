//! Route definitions for the Albatross web server

use crate::{auth, handlers, AppState};
use axum::{routing::get, Router};

pub const INDEX_PATH: &str = "/";
pub const LOGOUT_PATH: &str = "/logout/";
pub const API_PREFIX: &str = "/api";
pub const HEALTH_PATH: &str = "/health";

/// Whether `path` is already taken by a fixed route
pub fn is_reserved(path: &str) -> bool {
    path == INDEX_PATH
        || path == LOGOUT_PATH
        || path
            .strip_prefix(API_PREFIX)
            .is_some_and(|rest| rest == HEALTH_PATH)
}

/// Dashboard pages, with the login entry point mounted at the configured `login_url`
pub fn page_routes(login_url: &str) -> Router<AppState> {
    Router::new()
        .route(INDEX_PATH, get(handlers::dashboard_index))
        .route(
            login_url,
            get(auth::handlers::login_page).post(auth::handlers::login_submit),
        )
        .route(LOGOUT_PATH, get(auth::handlers::logout))
}

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(handlers::health_check))
}

/// Create all routes combined
pub fn all_routes(login_url: &str) -> Router<AppState> {
    Router::new()
        .merge(page_routes(login_url))
        .nest(API_PREFIX, api_routes())
}
