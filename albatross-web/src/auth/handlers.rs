//! Login and logout handlers

use super::sessions::{removal_cookie, session_cookie, session_id_from_jar};
use crate::{handlers::found, templates::LoginTemplate, AppState, WebResult};
use albatross_core::{HandshakeState, LoginForm, LoginHandshake, LoginOutcome, LoginSubmission};
use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{debug, info};

/// Query string of the login page
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Render the empty login form, carrying `next` as a hidden field
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> WebResult<Html<String>> {
    debug!(state = ?HandshakeState::Unauthenticated, "Serving login form");
    let form = LoginForm::blank(query.next);
    Ok(Html(LoginTemplate::from_form(&form, state.login_url()).render()?))
}

/// Run the login handshake for a submitted form
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    submission: Result<Form<LoginSubmission>, FormRejection>,
) -> WebResult<Response> {
    // An unparseable body still goes through the handshake and is rejected there.
    let submission = match submission {
        Ok(Form(submission)) => submission,
        Err(rejection) => {
            debug!(error = %rejection, "Login body could not be decoded");
            LoginSubmission::default()
        }
    };

    let handshake = LoginHandshake::new(state.users.as_ref(), &state.sessions);

    match handshake.submit(submission).await? {
        LoginOutcome::Authenticated {
            session,
            redirect_to,
            ..
        } => {
            // A fresh session replaces whatever the browser held before.
            if let Some(previous) = session_id_from_jar(&jar, &state.config.session) {
                state.sessions.destroy(previous).await;
            }
            let jar = jar.add(session_cookie(&session, &state.config.session));
            Ok((jar, found(&redirect_to)).into_response())
        }
        LoginOutcome::Rejected { form } => {
            let page = LoginTemplate::from_form(&form, state.login_url()).render()?;
            Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
        }
    }
}

/// End the session and return to the login page
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(session_id) = session_id_from_jar(&jar, &state.config.session) {
        if state.sessions.destroy(session_id).await {
            info!("User logged out");
        }
    }
    let jar = jar.remove(removal_cookie(&state.config.session));
    (jar, found(state.login_url())).into_response()
}
