//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::{header, request::Parts};

use blogicum_core::{ValidationError, Viewer};

use super::error::ApiError;
use super::server::AppState;
use crate::auth::digest_token;
use crate::db::{SessionRepo, User};

/// JSON request body; decode failures become 400 `validation_error`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string; decode failures become 400 `validation_error`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent; a malformed header is an error.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized {
            reason: "malformed Authorization header",
        })?;
    Ok(Some(token))
}

/// Resolve the request's session, if it presents one.
async fn session_user(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<(User, String)>, ApiError> {
    let Some(token) = bearer_token(parts)? else {
        return Ok(None);
    };

    let token_hash = digest_token(token);
    let user = SessionRepo::new(&state.pool)
        .find_user(&token_hash)
        .await?
        .ok_or(ApiError::Unauthorized {
            reason: "invalid or expired session",
        })?;
    Ok(Some((user, token_hash)))
}

/// The logged-in user. Rejects with 401 when there is no valid session.
pub struct CurrentUser {
    pub user: User,
    /// Digest of the session token used for this request
    pub token_hash: String,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (user, token_hash) =
            session_user(parts, state)
                .await?
                .ok_or(ApiError::Unauthorized {
                    reason: "authentication required",
                })?;
        Ok(Self { user, token_hash })
    }
}

/// The logged-in user if there is one. A token that does not resolve is
/// still a 401 so clients notice expired sessions.
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::from(self.0.as_ref().map(|u| u.id))
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = session_user(parts, state).await?.map(|(user, _)| user);
        Ok(Self(user))
    }
}

/// Parse a numeric ID path segment.
fn parse_id(field: &'static str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::Validation(ValidationError::InvalidFormat {
            field,
            reason: "must be a positive integer",
        }))
}

/// Extract and validate a post ID from `/posts/{post_id}`
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "post_id" }))?;

        Ok(Self(parse_id("post_id", &raw)?))
    }
}

/// Extract and validate `/posts/{post_id}/comments/{comment_id}`
pub struct CommentPath {
    pub post_id: i64,
    pub comment_id: i64,
}

impl<S> FromRequestParts<S> for CommentPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((post_id, comment_id)): Path<(String, String)> =
            Path::from_request_parts(parts, state).await.map_err(|_| {
                ApiError::Validation(ValidationError::Empty {
                    field: "comment_id",
                })
            })?;

        Ok(Self {
            post_id: parse_id("post_id", &post_id)?,
            comment_id: parse_id("comment_id", &comment_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/posts");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_absent() {
        assert!(bearer_token(&parts_with_auth(None)).unwrap().is_none());
    }

    #[test]
    fn bearer_token_present() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_token(&parts).unwrap(), Some("abc123"));
    }

    #[test]
    fn bearer_token_malformed() {
        for value in ["Basic dXNlcjpwdw==", "Bearer ", "abc123"] {
            let parts = parts_with_auth(Some(value));
            assert!(matches!(
                bearer_token(&parts),
                Err(ApiError::Unauthorized { .. })
            ));
        }
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("post_id", "42").unwrap(), 42);
        assert!(parse_id("post_id", "0").is_err());
        assert!(parse_id("post_id", "-3").is_err());
        assert!(parse_id("post_id", "abc").is_err());
    }
}
