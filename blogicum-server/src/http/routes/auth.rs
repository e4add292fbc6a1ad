//! Registration, login, logout and password change

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use blogicum_core::{Email, Password, PersonName, Username, ValidationError};

use super::profiles::ProfileResponse;
use crate::auth::{
    hash_password_blocking, verify_password_blocking, verify_unknown_user_blocking, SessionToken,
};
use crate::db::{NewUser, SessionRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, JsonBody};
use crate::http::server::AppState;

const BAD_CREDENTIALS: &str = "invalid username or password";

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Validated registration, still holding the plain password
struct Registration {
    username: Username,
    password: Password,
    email: Email,
    first_name: PersonName,
    last_name: PersonName,
}

impl RegistrationForm {
    fn validate(self) -> Result<Registration, ValidationError> {
        let username = Username::new(&self.username)?;
        Ok(Registration {
            password: Password::new(&self.password, username.as_str())?,
            username,
            email: Email::new(&self.email)?,
            first_name: PersonName::new("first_name", &self.first_name)?,
            last_name: PersonName::new("last_name", &self.last_name)?,
        })
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued session
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: ProfileResponse,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password: String,
}

/// POST /auth/registration - create an account
async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(form): JsonBody<RegistrationForm>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let reg = form.validate()?;
    let password_hash = hash_password_blocking(reg.password).await?;

    let user = UserRepo::new(&state.pool)
        .create(NewUser {
            username: reg.username,
            email: reg.email,
            first_name: reg.first_name,
            last_name: reg.last_name,
            password_hash,
            is_staff: false,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(ProfileResponse::own(user))))
}

/// When a session issued at `now` stops working.
fn session_expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, ApiError> {
    now.checked_add_signed(ttl).ok_or_else(|| ApiError::Internal {
        message: format!("session lifetime of {ttl} overflows the clock"),
    })
}

/// POST /auth/login - exchange credentials for a bearer token
async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(form): JsonBody<LoginForm>,
) -> Result<Json<LoginResponse>, ApiError> {
    let users = UserRepo::new(&state.pool);
    let Some(creds) = users.credentials(&form.username).await? else {
        verify_unknown_user_blocking(form.password).await?;
        tracing::debug!(username = %form.username, "Login rejected: unknown user");
        return Err(ApiError::Unauthorized {
            reason: BAD_CREDENTIALS,
        });
    };

    if !verify_password_blocking(form.password, creds.password_hash).await? {
        tracing::debug!(username = %creds.username, "Login rejected");
        return Err(ApiError::Unauthorized {
            reason: BAD_CREDENTIALS,
        });
    }

    let token = SessionToken::generate();
    let expires_at = session_expiry(Utc::now(), state.session_ttl)?;
    SessionRepo::new(&state.pool)
        .create(creds.id, &token.digest(), expires_at)
        .await?;

    let user = users.get(creds.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        token: token.as_str().to_owned(),
        expires_at: expires_at.to_rfc3339(),
        user: ProfileResponse::own(user),
    }))
}

/// POST /auth/logout - end the current session
async fn logout(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    SessionRepo::new(&state.pool).delete(&user.token_hash).await?;
    tracing::info!(user_id = user.id(), "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/password_change - set a new password, ending other sessions
async fn change_password(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    JsonBody(form): JsonBody<PasswordChangeForm>,
) -> Result<StatusCode, ApiError> {
    let users = UserRepo::new(&state.pool);
    let creds = users.credentials_by_id(user.id()).await?;

    if !verify_password_blocking(form.old_password, creds.password_hash).await? {
        return Err(ValidationError::InvalidFormat {
            field: "old_password",
            reason: "does not match the current password",
        }
        .into());
    }

    let new_password = Password::new(&form.new_password, &creds.username)?;
    let password_hash = hash_password_blocking(new_password).await?;
    users.set_password(user.id(), &password_hash).await?;

    let dropped = SessionRepo::new(&state.pool)
        .delete_others(user.id(), &user.token_hash)
        .await?;
    tracing::info!(user_id = user.id(), dropped, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/registration", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password_change", post(change_password))
}
