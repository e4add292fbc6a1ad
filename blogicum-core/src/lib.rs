//! blogicum-core: the pieces of the blog that do not touch a database
//!
//! - Validated value types for every piece of user input
//! - Pagination
//! - Visibility and ownership rules for posts and comments
//! - Layered configuration (TOML file, `.env`, environment)

pub mod config;
pub mod models;
pub mod visibility;

pub use config::{load_dotenv, BlogConfig, ConfigError, MAX_SESSION_TTL_HOURS};
pub use models::{
    Body, CategorySlug, Email, ImageRef, Paginated, Pagination, PaginationParams, Password,
    PersonName, Title, Username, ValidationError, POSTS_ON_PAGE,
};
pub use visibility::{
    can_view_post, ensure_author, is_publicly_visible, shown_if_published, NotAuthor, Viewer,
};
