//! Page and API handlers

use crate::{auth::OptionalUser, routes::LOGOUT_PATH, templates::IndexTemplate, WebResult};
use askama::Template;
use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;

/// 302 Found to `location`
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Dashboard index
pub async fn dashboard_index(OptionalUser(user): OptionalUser) -> WebResult<Html<String>> {
    let page = IndexTemplate {
        page_title: "Index".to_string(),
        body_class: String::new(),
        username: user.map(|u| u.username).unwrap_or_default(),
        logout_url: LOGOUT_PATH.to_string(),
    };
    Ok(Html(page.render()?))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_sets_location() {
        let response = found("/login/?next=%2F");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login/?next=%2F");
    }
}
