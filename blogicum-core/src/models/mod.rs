//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod account;
pub mod text;
pub mod slug;
pub mod image;
pub mod pagination;

pub use validation::ValidationError;
pub use account::{Email, Password, PersonName, Username};
pub use text::{Body, Title};
pub use slug::CategorySlug;
pub use image::ImageRef;
pub use pagination::{Paginated, Pagination, PaginationParams, POSTS_ON_PAGE};
