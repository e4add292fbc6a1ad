//! Comment endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use blogicum_core::{Body, Viewer};

use super::posts::{viewable_post, AuthorRef};
use crate::db::{CommentRepo, CommentView};
use crate::http::error::ApiError;
use crate::http::extractors::{CommentPath, CurrentUser, JsonBody, PostId};
use crate::http::server::AppState;

/// Create/edit comment request
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

/// Comment response
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub author: AuthorRef,
    pub text: String,
    pub created_at: String,
}

impl From<CommentView> for CommentResponse {
    fn from(c: CommentView) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author: AuthorRef {
                id: c.author_id,
                username: c.author_username,
            },
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// POST /posts/{post_id}/comments - comment on a post the user can see
async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PostId(post_id): PostId,
    JsonBody(form): JsonBody<CommentForm>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let text = Body::new("text", &form.text)?;
    viewable_post(&state, Viewer::User(user.id()), post_id).await?;

    let comment = CommentRepo::new(&state.pool)
        .create(post_id, user.id(), text)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// PUT /posts/{post_id}/comments/{comment_id} - edit own comment
async fn edit_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    path: CommentPath,
    JsonBody(form): JsonBody<CommentForm>,
) -> Result<Json<CommentResponse>, ApiError> {
    let text = Body::new("text", &form.text)?;
    let comment = CommentRepo::new(&state.pool)
        .update(path.post_id, path.comment_id, user.id(), text)
        .await?;
    Ok(Json(CommentResponse::from(comment)))
}

/// DELETE /posts/{post_id}/comments/{comment_id} - delete own comment
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    path: CommentPath,
) -> Result<StatusCode, ApiError> {
    CommentRepo::new(&state.pool)
        .delete(path.post_id, path.comment_id, user.id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Comment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts/{post_id}/comments", post(create_comment))
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            put(edit_comment).delete(delete_comment),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn response_carries_author() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let response = CommentResponse::from(CommentView {
            id: 4,
            post_id: 2,
            author_id: 7,
            author_username: "mia".into(),
            text: "Great photo".into(),
            created_at,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["author"]["username"], "mia");
        assert_eq!(json["post_id"], 2);
        assert_eq!(json["created_at"], "2024-05-01T08:30:00+00:00");
    }
}
