//! Access gate middleware
//!
//! Resolves the session cookie, asks the decision engine whether the request
//! may proceed, and turns a challenge into a redirect to the login page that
//! carries the requested path and query as `next`.

use crate::{
    auth::{sessions::session_id_from_jar, CurrentUser},
    handlers::found,
    AppState,
};
use albatross_core::{login_redirect_target, GateDecision, RequestContext};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

/// Gate every routed request before it reaches its handler
pub async fn access_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let session = match session_id_from_jar(&jar, &state.config.session) {
        Some(session_id) => state.sessions.load(session_id).await,
        None => None,
    };

    let ctx = RequestContext::new(request.uri().path(), session.is_some());
    let verdict = state.gate.evaluate(&ctx);
    debug!(
        method = %request.method(),
        path = %ctx.path,
        authenticated = ctx.authenticated,
        decision = ?verdict.decision,
        reason = ?verdict.reason,
        pattern = verdict.pattern,
        "Access gate decision"
    );

    match verdict.decision {
        GateDecision::Allow => {
            if let Some(record) = &session {
                request.extensions_mut().insert(CurrentUser::from(record));
            }
            next.run(request).await
        }
        GateDecision::Challenge => {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| request.uri().path());
            found(&login_redirect_target(state.login_url(), requested))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebConfig;
    use albatross_core::{SessionStore, UserRecord};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(crate::auth::OptionalUser(user): crate::auth::OptionalUser) -> String {
        user.map(|u| u.username).unwrap_or_else(|| "anonymous".to_string())
    }

    async fn test_app() -> (Router, AppState) {
        let mut config = WebConfig::default();
        config.gate.required_patterns = vec![r"/topsecret/(.*)$".to_string()];
        config.gate.exempt_patterns = vec![
            r"/topsecret/login(.*)$".to_string(),
            r"/topsecret/logout(.*)$".to_string(),
        ];
        config.gate.login_url = "/topsecret/login/".to_string();

        let state = AppState::new(config).await.unwrap();
        let app = Router::new()
            .route("/topsecret/data", get(whoami))
            .route("/topsecret/login/", get(whoami))
            .route("/public", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                access_gate_middleware,
            ))
            .with_state(state.clone());
        (app, state)
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_request_to_required_path_is_redirected() {
        let (app, _) = test_app().await;

        let response = app
            .oneshot(get_request("/topsecret/data?x=1", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/topsecret/login/?next=%2Ftopsecret%2Fdata%3Fx%3D1"
        );
    }

    #[tokio::test]
    async fn test_exempt_and_unmatched_paths_pass() {
        let (app, _) = test_app().await;

        let response = app
            .clone()
            .oneshot(get_request("/topsecret/login/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");

        let response = app.oneshot(get_request("/public", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_valid_session_is_allowed_and_exposed() {
        let (app, state) = test_app().await;
        let record = state
            .sessions
            .establish(&UserRecord {
                id: "u-1".to_string(),
                username: "alice".to_string(),
                is_active: true,
            })
            .await
            .unwrap();

        let cookie = format!("sessionid={}", record.id);
        let response = app
            .oneshot(get_request("/topsecret/data", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "alice");
    }

    #[tokio::test]
    async fn test_unknown_session_cookie_is_challenged() {
        let (app, _) = test_app().await;

        let response = app
            .oneshot(get_request("/topsecret/data", Some("sessionid=forged")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
    }
}
