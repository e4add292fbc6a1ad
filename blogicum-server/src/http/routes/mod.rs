//! Route handlers organized by resource

pub mod catalog;
pub mod auth;
pub mod profiles;
pub mod posts;
pub mod comments;
