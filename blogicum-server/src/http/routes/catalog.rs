//! Feed, category pages, the category/location lists and `/health`

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use blogicum_core::{Paginated, Pagination, PaginationParams, POSTS_ON_PAGE};

use super::posts::PostResponse;
use crate::db::{Category, CategoryRepo, Location, LocationRepo, PostRepo};
use crate::http::error::ApiError;
use crate::http::extractors::QueryParams;
use crate::http::server::AppState;

/// Liveness answer; does not touch the database
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub version: &'static str,
    /// Page size used when a listing is asked for without `per_page`
    pub posts_on_page: u32,
}

/// Category response
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            title: c.title,
            description: c.description,
        }
    }
}

/// Location response
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: i64,
    pub name: String,
}

impl From<Location> for LocationResponse {
    fn from(l: Location) -> Self {
        Self {
            id: l.id,
            name: l.name,
        }
    }
}

/// A category page: the category and its public posts
#[derive(Debug, Serialize)]
pub struct CategoryPageResponse {
    pub category: CategoryResponse,
    pub posts: Paginated<PostResponse>,
}

/// GET /health
async fn health() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        posts_on_page: POSTS_ON_PAGE,
    })
}

/// GET / - public posts, newest first
async fn index(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<Json<Paginated<PostResponse>>, ApiError> {
    let page = Pagination::from(params);
    let posts = PostRepo::new(&state.pool)
        .list_public(Utc::now(), page)
        .await?;
    Ok(Json(posts.map(PostResponse::from)))
}

/// GET /category/{slug} - public posts in a published category
async fn category_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<Json<CategoryPageResponse>, ApiError> {
    let category = CategoryRepo::new(&state.pool).get_published(&slug).await?;
    let posts = PostRepo::new(&state.pool)
        .list_public_in_category(category.id, Utc::now(), Pagination::from(params))
        .await?;

    Ok(Json(CategoryPageResponse {
        category: CategoryResponse::from(category),
        posts: posts.map(PostResponse::from),
    }))
}

/// GET /categories - published categories
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = CategoryRepo::new(&state.pool).list_published().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /locations - published locations
async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LocationResponse>>, ApiError> {
    let locations = LocationRepo::new(&state.pool).list_published().await?;
    Ok(Json(locations.into_iter().map(LocationResponse::from).collect()))
}

/// Catalog routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/category/{slug}", get(category_posts))
        .route("/categories", get(list_categories))
        .route("/locations", get(list_locations))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_version_and_page_size() {
        let Json(status) = health().await;
        assert_eq!(status.status, "ok");
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(status.posts_on_page, 10);
    }
}
