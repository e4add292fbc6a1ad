//! Profile pages

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use blogicum_core::{
    Email, Paginated, Pagination, PaginationParams, PersonName, Username, ValidationError,
};

use super::posts::PostResponse;
use crate::db::{PostRepo, ProfileChanges, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, JsonBody, MaybeUser, QueryParams};
use crate::http::server::AppState;

/// Public profile. `email` is only filled in for the owner.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub date_joined: String,
}

impl ProfileResponse {
    /// The profile as its owner sees it.
    pub fn own(user: User) -> Self {
        let email = Some(user.email.clone());
        Self {
            email,
            ..Self::public(user)
        }
    }

    /// The profile as everyone else sees it.
    pub fn public(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: None,
            date_joined: user.date_joined.to_rfc3339(),
        }
    }
}

/// A profile page: the user and their posts
#[derive(Debug, Serialize)]
pub struct ProfilePageResponse {
    pub profile: ProfileResponse,
    pub posts: Paginated<PostResponse>,
}

/// Edit profile request. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileForm {
    pub fn validate(self) -> Result<ProfileChanges, ValidationError> {
        Ok(ProfileChanges {
            username: self.username.as_deref().map(Username::new).transpose()?,
            email: self.email.as_deref().map(Email::new).transpose()?,
            first_name: self
                .first_name
                .as_deref()
                .map(|s| PersonName::new("first_name", s))
                .transpose()?,
            last_name: self
                .last_name
                .as_deref()
                .map(|s| PersonName::new("last_name", s))
                .transpose()?,
        })
    }
}

/// GET /profile/{username} - a user's posts; the owner also sees hidden ones
async fn profile(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<Json<ProfilePageResponse>, ApiError> {
    let user = UserRepo::new(&state.pool).get_by_username(&username).await?;
    let is_owner = viewer.viewer().is(user.id);

    let posts = PostRepo::new(&state.pool)
        .list_by_author(user.id, is_owner, Utc::now(), Pagination::from(params))
        .await?;

    let profile = if is_owner {
        ProfileResponse::own(user)
    } else {
        ProfileResponse::public(user)
    };

    Ok(Json(ProfilePageResponse {
        profile,
        posts: posts.map(PostResponse::from),
    }))
}

/// PATCH /profile - edit own profile
async fn edit_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    JsonBody(form): JsonBody<ProfileForm>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let changes = form.validate()?;
    let updated = UserRepo::new(&state.pool)
        .update_profile(user.id(), changes)
        .await?;

    tracing::info!(user_id = updated.id, "Profile updated");
    Ok(Json(ProfileResponse::own(updated)))
}

/// Profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", patch(edit_profile))
        .route("/profile/{username}", get(profile))
}
