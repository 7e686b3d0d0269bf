//! Login handshake
//!
//! `Unauthenticated -> Pending -> Authenticated | Rejected`. A rejection always
//! hands back a re-renderable form with the next-page intact; only
//! collaborator faults surface as errors.

use crate::error::{AlbatrossError, AlbatrossResult};
use crate::next_page::resolve_next_page;
use crate::session::{apply_session_policy, remember_me_requested, SessionHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";

pub const USERNAME_MAX_LENGTH: usize = 100;
pub const PASSWORD_MAX_LENGTH: usize = 1000;

/// A user as reported by the credential store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub is_active: bool,
}

/// Credential verification capability
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` when the credentials do not match a user
    async fn verify(&self, username: &str, password: &str) -> AlbatrossResult<Option<UserRecord>>;
}

/// Session establishment capability
#[async_trait]
pub trait SessionStore: Send + Sync {
    type Handle: SessionHandle + Send;

    async fn establish(&self, user: &UserRecord) -> AlbatrossResult<Self::Handle>;

    /// Persist changes made to the handle after establishment
    async fn save(&self, handle: &Self::Handle) -> AlbatrossResult<()>;
}

/// Raw login form body as submitted by the client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginSubmission {
    pub username: Option<String>,
    pub password: Option<String>,
    pub next: Option<String>,
    pub remember_me: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    TooLong,
    Authentication,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn required() -> Self {
        Self {
            kind: FieldErrorKind::Required,
            message: "This field is required.".to_string(),
        }
    }

    pub fn too_long(max: usize) -> Self {
        Self {
            kind: FieldErrorKind::TooLong,
            message: format!("Ensure this value has at most {max} characters."),
        }
    }
}

impl From<&AlbatrossError> for FieldError {
    fn from(err: &AlbatrossError) -> Self {
        Self {
            kind: FieldErrorKind::Authentication,
            message: err.to_string(),
        }
    }
}

/// Field name -> errors, in field order
pub type FieldErrors = BTreeMap<String, Vec<FieldError>>;

/// Re-renderable login form state. The password is never carried back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub next: Option<String>,
    pub remember_me: bool,
    pub errors: FieldErrors,
}

impl LoginForm {
    /// Blank form for the initial GET, carrying the destination to resume
    pub fn blank(next: Option<String>) -> Self {
        Self {
            next,
            ..Self::default()
        }
    }

    pub fn add_error(&mut self, field: &str, error: FieldError) {
        self.errors.entry(field.to_string()).or_default().push(error);
    }

    pub fn errors_for(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Handshake states; the last two are the outcomes of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
    Unauthenticated,
    Pending,
    Authenticated,
    Rejected,
}

#[derive(Debug)]
pub enum LoginOutcome<H> {
    Authenticated {
        session: H,
        user: UserRecord,
        redirect_to: String,
    },
    Rejected {
        form: LoginForm,
    },
}

impl<H> LoginOutcome<H> {
    pub fn state(&self) -> HandshakeState {
        match self {
            LoginOutcome::Authenticated { .. } => HandshakeState::Authenticated,
            LoginOutcome::Rejected { .. } => HandshakeState::Rejected,
        }
    }
}

/// Credentials that passed form validation
struct Credentials {
    username: String,
    password: String,
}

fn validate(submission: LoginSubmission) -> (LoginForm, Option<Credentials>) {
    let password = submission.password.unwrap_or_default();

    let mut form = LoginForm {
        username: submission.username.unwrap_or_default(),
        next: submission.next.filter(|n| !n.is_empty()),
        remember_me: remember_me_requested(submission.remember_me.as_deref()),
        errors: FieldErrors::new(),
    };

    // Surrounding whitespace counts for validation only; the authenticator
    // sees the username as submitted.
    let trimmed_username = form.username.trim().to_string();
    check_field(&mut form, USERNAME_FIELD, &trimmed_username, USERNAME_MAX_LENGTH);
    check_field(&mut form, PASSWORD_FIELD, &password, PASSWORD_MAX_LENGTH);

    if form.is_valid() {
        let credentials = Credentials {
            username: form.username.clone(),
            password,
        };
        (form, Some(credentials))
    } else {
        (form, None)
    }
}

fn check_field(form: &mut LoginForm, field: &str, value: &str, max: usize) {
    if value.is_empty() {
        form.add_error(field, FieldError::required());
    } else if value.chars().count() > max {
        form.add_error(field, FieldError::too_long(max));
    }
}

/// Drives one credential submission through the collaborators
pub struct LoginHandshake<'a, A: ?Sized, S: ?Sized> {
    authenticator: &'a A,
    sessions: &'a S,
}

impl<'a, A, S> LoginHandshake<'a, A, S>
where
    A: Authenticator + ?Sized,
    S: SessionStore + ?Sized,
{
    pub fn new(authenticator: &'a A, sessions: &'a S) -> Self {
        Self {
            authenticator,
            sessions,
        }
    }

    pub async fn submit(&self, submission: LoginSubmission) -> AlbatrossResult<LoginOutcome<S::Handle>> {
        let (mut form, credentials) = validate(submission);
        debug!(username = %form.username, state = ?HandshakeState::Pending, "Login submitted");

        let user = match credentials {
            Some(credentials) => self
                .authenticator
                .verify(&credentials.username, &credentials.password)
                .await?
                .filter(|user| user.is_active),
            None => None,
        };

        let Some(user) = user else {
            let err = AlbatrossError::authentication();
            form.add_error(USERNAME_FIELD, FieldError::from(&err));
            warn!(username = %form.username, state = ?HandshakeState::Rejected, "Login rejected");
            return Ok(LoginOutcome::Rejected { form });
        };

        let mut session = self.sessions.establish(&user).await?;
        apply_session_policy(form.remember_me, &mut session);
        self.sessions.save(&session).await?;

        let redirect_to = resolve_next_page(form.next.as_deref());
        info!(
            user_id = %user.id,
            username = %user.username,
            expiry = ?session.expiry(),
            redirect_to = %redirect_to,
            state = ?HandshakeState::Authenticated,
            "Login succeeded"
        );

        Ok(LoginOutcome::Authenticated {
            session,
            user,
            redirect_to,
        })
    }
}
