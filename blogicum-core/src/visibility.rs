//! Who may see and who may change a post or comment
//!
//! A post is public when it is published, its `pub_date` has passed, and it
//! sits in a published category. Authors always see their own posts.
//! Only the author may edit or delete a post or comment.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The user making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(i64),
}

impl Viewer {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    /// True when the viewer is the user with `id`.
    pub fn is(&self, id: i64) -> bool {
        self.user_id() == Some(id)
    }
}

impl From<Option<i64>> for Viewer {
    fn from(id: Option<i64>) -> Self {
        id.map_or(Self::Anonymous, Self::User)
    }
}

/// Public visibility of a post.
///
/// `category_published` is `None` when the post has no category (it was
/// deleted); such posts are not public.
pub fn is_publicly_visible(
    is_published: bool,
    pub_date: DateTime<Utc>,
    category_published: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    is_published && pub_date <= now && category_published == Some(true)
}

/// Whether `viewer` may open a post written by `author_id`.
pub fn can_view_post(viewer: &Viewer, author_id: i64, public: bool) -> bool {
    public || viewer.is(author_id)
}

/// Raised when someone other than the author tries to change a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("only the author may change this {resource}")]
pub struct NotAuthor {
    pub resource: &'static str,
}

pub fn ensure_author(resource: &'static str, owner_id: i64, user_id: i64) -> Result<(), NotAuthor> {
    if owner_id == user_id {
        Ok(())
    } else {
        Err(NotAuthor { resource })
    }
}

/// Drop a related record's value unless it is published.
pub fn shown_if_published<T>(value: Option<T>, is_published: Option<bool>) -> Option<T> {
    value.filter(|_| is_published == Some(true))
}
