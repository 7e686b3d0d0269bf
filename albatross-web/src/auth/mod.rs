//! Authentication collaborators and extractors

pub mod handlers;
pub mod sessions;
pub mod users;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

/// The user bound to the current request's session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub session_id: String,
}

impl From<&sessions::SessionRecord> for CurrentUser {
    fn from(record: &sessions::SessionRecord) -> Self {
        Self {
            id: record.user_id.clone(),
            username: record.username.clone(),
            session_id: record.id.clone(),
        }
    }
}

/// Optional user extractor - doesn't fail if user is not authenticated
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};

    #[tokio::test]
    async fn test_optional_user_reads_extension() {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request.extensions_mut().insert(CurrentUser {
            id: "u-1".to_string(),
            username: "alice".to_string(),
            session_id: "s-1".to_string(),
        });
        let (mut parts, _) = request.into_parts();

        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_optional_user_without_session() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (mut parts, _) = request.into_parts();

        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }
}
