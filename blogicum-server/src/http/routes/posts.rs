//! Post endpoints
//!
//! Anyone may read a public post; authors also see their own drafts and
//! scheduled posts. Only the author may edit or delete.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blogicum_core::{
    can_view_post, shown_if_published, Body, ImageRef, Title, ValidationError, Viewer,
};

use super::comments::CommentResponse;
use crate::db::{CommentRepo, PostInput, PostRepo, PostView};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, JsonBody, MaybeUser, PostId};
use crate::http::server::AppState;

/// Create/edit post request. Edits replace every field.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    /// Defaults to now
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    pub image: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

impl PostForm {
    /// Validate every field into a [`PostInput`].
    pub fn validate(self, now: DateTime<Utc>) -> Result<PostInput, ValidationError> {
        Ok(PostInput {
            title: Title::new(&self.title)?,
            text: Body::new("text", &self.text)?,
            pub_date: self.pub_date.unwrap_or(now),
            category_id: self.category_id.ok_or(ValidationError::Empty {
                field: "category_id",
            })?,
            location_id: self.location_id,
            image: ImageRef::parse(self.image.as_deref())?,
            is_published: self.is_published,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    /// Hidden while the location is unpublished
    pub location: Option<LocationRef>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: String,
    pub comment_count: i64,
}

impl From<PostView> for PostResponse {
    fn from(p: PostView) -> Self {
        let category = match (p.category_id, p.category_slug, p.category_title) {
            (Some(id), Some(slug), Some(title)) => Some(CategoryRef { id, slug, title }),
            _ => None,
        };
        let location = match (p.location_id, p.location_name) {
            (Some(id), Some(name)) => Some(LocationRef { id, name }),
            _ => None,
        };

        Self {
            id: p.id,
            title: p.title,
            text: p.text,
            pub_date: p.pub_date.to_rfc3339(),
            author: AuthorRef {
                id: p.author_id,
                username: p.author_username,
            },
            category,
            location: shown_if_published(location, p.location_published),
            image: p.image,
            is_published: p.is_published,
            created_at: p.created_at.to_rfc3339(),
            comment_count: p.comment_count,
        }
    }
}

/// Post with its comments, oldest first
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// Load a post the viewer is allowed to see. Hidden posts are "not found".
pub(crate) async fn viewable_post(
    state: &AppState,
    viewer: Viewer,
    post_id: i64,
) -> Result<PostView, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if !can_view_post(&viewer, post.author_id, post.is_public(Utc::now())) {
        return Err(ApiError::not_found("post", post_id));
    }
    Ok(post)
}

/// POST /posts - publish a new post as the current user
async fn create_post(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    JsonBody(form): JsonBody<PostForm>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let input = form.validate(Utc::now())?;
    let post = PostRepo::new(&state.pool).create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// GET /posts/{post_id} - a post with its comments
async fn post_detail(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    PostId(post_id): PostId,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post = viewable_post(&state, viewer.viewer(), post_id).await?;
    let comments = CommentRepo::new(&state.pool).list_for_post(post_id).await?;

    Ok(Json(PostDetailResponse {
        post: PostResponse::from(post),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

/// PUT /posts/{post_id} - replace a post (author only)
async fn edit_post(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PostId(post_id): PostId,
    JsonBody(form): JsonBody<PostForm>,
) -> Result<Json<PostResponse>, ApiError> {
    let input = form.validate(Utc::now())?;
    let post = PostRepo::new(&state.pool)
        .update(post_id, user.id(), input)
        .await?;
    Ok(Json(PostResponse::from(post)))
}

/// DELETE /posts/{post_id} - delete a post and its comments (author only)
async fn delete_post(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PostId(post_id): PostId,
) -> Result<StatusCode, ApiError> {
    PostRepo::new(&state.pool).delete(post_id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", post(create_post))
        .route(
            "/posts/{post_id}",
            get(post_detail).put(edit_post).delete(delete_post),
        )
}
