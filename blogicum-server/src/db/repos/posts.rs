//! Post repository
//!
//! Every read returns `PostView`: the post joined with its author, category,
//! location and comment count in one query. Public listings apply the same
//! rule as `blogicum_core::is_publicly_visible` in SQL.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};

use blogicum_core::{ensure_author, is_publicly_visible, Body, ImageRef, Paginated, Pagination, Title};

use super::DbError;

/// Post joined with everything a reader needs to render it
#[derive(Debug, Clone, FromRow)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub category_id: Option<i64>,
    pub category_slug: Option<String>,
    pub category_title: Option<String>,
    pub category_published: Option<bool>,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub location_published: Option<bool>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
}

impl PostView {
    /// Whether anyone may read this post at `now`.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        is_publicly_visible(self.is_published, self.pub_date, self.category_published, now)
    }
}

/// Validated post form
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: Title,
    pub text: Body,
    pub pub_date: DateTime<Utc>,
    pub category_id: i64,
    pub location_id: Option<i64>,
    pub image: Option<ImageRef>,
    pub is_published: bool,
}

/// Select list shared by every read. Expects the post aliased as `p`.
const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.text, p.pub_date, p.author_id,
        u.username AS author_username,
        p.category_id,
        c.slug AS category_slug,
        c.title AS category_title,
        c.is_published AS category_published,
        p.location_id,
        l.name AS location_name,
        l.is_published AS location_published,
        p.image, p.is_published, p.created_at,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Public posts, newest first.
    pub async fn list_public(
        &self,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Paginated<PostView>, DbError> {
        let sql = format!(
            r#"
            {POST_SELECT}, COUNT(*) OVER() AS total
            FROM posts p
            {POST_JOINS}
            WHERE p.is_published AND p.pub_date <= $1 AND c.is_published IS TRUE
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(now)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        paginate(rows, page)
    }

    /// Public posts in one category, newest first.
    pub async fn list_public_in_category(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Paginated<PostView>, DbError> {
        let sql = format!(
            r#"
            {POST_SELECT}, COUNT(*) OVER() AS total
            FROM posts p
            {POST_JOINS}
            WHERE p.category_id = $1
            AND p.is_published AND p.pub_date <= $2 AND c.is_published IS TRUE
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(category_id)
            .bind(now)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        paginate(rows, page)
    }

    /// Posts by one author. With `include_hidden` the author's drafts,
    /// scheduled and uncategorised posts are included too.
    pub async fn list_by_author(
        &self,
        author_id: i64,
        include_hidden: bool,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Paginated<PostView>, DbError> {
        let sql = format!(
            r#"
            {POST_SELECT}, COUNT(*) OVER() AS total
            FROM posts p
            {POST_JOINS}
            WHERE p.author_id = $1
            AND ($2 OR (p.is_published AND p.pub_date <= $3 AND c.is_published IS TRUE))
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $4 OFFSET $5
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(author_id)
            .bind(include_hidden)
            .bind(now)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        paginate(rows, page)
    }

    /// Get a single post by ID, regardless of visibility.
    pub async fn get(&self, id: i64) -> Result<PostView, DbError> {
        let sql = format!("{POST_SELECT} FROM posts p {POST_JOINS} WHERE p.id = $1");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))
    }

    /// Create a post owned by `author_id`.
    ///
    /// Uses a CTE so the insert and the joined read are one round trip.
    /// Unknown category/location IDs are `DbError::InvalidReference`.
    pub async fn create(&self, author_id: i64, input: PostInput) -> Result<PostView, DbError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts
                    (title, text, pub_date, author_id, category_id, location_id, image, is_published)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            {POST_SELECT}
            FROM p
            {POST_JOINS}
            "#
        );
        let post: PostView = sqlx::query_as(&sql)
            .bind(input.title.as_str())
            .bind(input.text.as_str())
            .bind(input.pub_date)
            .bind(author_id)
            .bind(input.category_id)
            .bind(input.location_id)
            .bind(input.image.as_ref().map(ImageRef::as_str))
            .bind(input.is_published)
            .fetch_one(self.pool)
            .await?;

        tracing::info!(post_id = post.id, author_id, "Post created");
        Ok(post)
    }

    /// Replace a post's fields. Only the author may do this.
    pub async fn update(&self, id: i64, user_id: i64, input: PostInput) -> Result<PostView, DbError> {
        let mut tx = self.pool.begin().await?;
        lock_owned_by(&mut tx, id, user_id).await?;

        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, text = $3, pub_date = $4, category_id = $5,
                location_id = $6, image = $7, is_published = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.title.as_str())
        .bind(input.text.as_str())
        .bind(input.pub_date)
        .bind(input.category_id)
        .bind(input.location_id)
        .bind(input.image.as_ref().map(ImageRef::as_str))
        .bind(input.is_published)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(post_id = id, "Post updated");
        self.get(id).await
    }

    /// Delete a post and, through the foreign key, its comments.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        lock_owned_by(&mut tx, id, user_id).await?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }
}

/// Lock the post row and check that `user_id` wrote it.
async fn lock_owned_by(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    user_id: i64,
) -> Result<(), DbError> {
    let owner: Option<(i64,)> = sqlx::query_as("SELECT author_id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    let (owner_id,) = owner.ok_or_else(|| DbError::not_found("post", id))?;
    ensure_author("post", owner_id, user_id)?;
    Ok(())
}

/// Page past the end is NotFound; the first page may be empty.
fn paginate(rows: Vec<PgRow>, page: Pagination) -> Result<Paginated<PostView>, DbError> {
    if rows.is_empty() && page.page > 1 {
        return Err(DbError::not_found("page", page.page));
    }
    let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
    let items = rows
        .iter()
        .map(PostView::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(page.wrap(items, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrate, CategoryRepo, NewCategory, NewUser, UserRepo};
    use blogicum_core::{CategorySlug, Email, PersonName, Username};
    use chrono::Duration;

    struct Fixture {
        pool: PgPool,
        author: i64,
        reader: i64,
        category: i64,
    }

    async fn fixture() -> Fixture {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrate(&pool).await.unwrap();

        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let users = UserRepo::new(&pool);
        let mut ids = Vec::new();
        for role in ["author", "reader"] {
            let user = users
                .create(NewUser {
                    username: Username::new(&format!("{role}-{stamp}")).unwrap(),
                    email: Email::default(),
                    first_name: PersonName::default(),
                    last_name: PersonName::default(),
                    password_hash: "x".into(),
                    is_staff: false,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }

        let category = CategoryRepo::new(&pool)
            .create(NewCategory {
                title: Title::new("Travel").unwrap(),
                description: Body::new("description", "Trips").unwrap(),
                slug: CategorySlug::new(&format!("travel-{stamp}")).unwrap(),
                is_published: true,
            })
            .await
            .unwrap();

        Fixture {
            pool,
            author: ids[0],
            reader: ids[1],
            category: category.id,
        }
    }

    #[test]
    fn empty_first_page_is_ok() {
        let page = paginate(Vec::new(), Pagination::default()).unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_prev());
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let err = paginate(Vec::new(), Pagination::new(5, 2)).unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "page", ref id } if id == "5"));
    }

    fn input(category_id: i64, pub_date: DateTime<Utc>) -> PostInput {
        PostInput {
            title: Title::new("Lake").unwrap(),
            text: Body::new("text", "Went to the lake").unwrap(),
            pub_date,
            category_id,
            location_id: None,
            image: None,
            is_published: true,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn scheduled_post_only_visible_to_author() {
        let f = fixture().await;
        let repo = PostRepo::new(&f.pool);
        let now = Utc::now();

        let post = repo
            .create(f.author, input(f.category, now + Duration::days(1)))
            .await
            .unwrap();
        assert!(!post.is_public(now));

        let own = repo.list_by_author(f.author, true, now, Pagination::default()).await.unwrap();
        assert!(own.items.iter().any(|p| p.id == post.id));

        let others = repo.list_by_author(f.author, false, now, Pagination::default()).await.unwrap();
        assert!(others.items.iter().all(|p| p.id != post.id));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn non_author_cannot_edit_or_delete() {
        let f = fixture().await;
        let repo = PostRepo::new(&f.pool);
        let post = repo.create(f.author, input(f.category, Utc::now())).await.unwrap();

        let err = repo
            .update(post.id, f.reader, input(f.category, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotAuthor(_)));

        let err = repo.delete(post.id, f.reader).await.unwrap_err();
        assert!(matches!(err, DbError::NotAuthor(_)));

        repo.delete(post.id, f.author).await.unwrap();
        assert!(matches!(
            repo.get(post.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_category_is_invalid_reference() {
        let f = fixture().await;
        let err = PostRepo::new(&f.pool)
            .create(f.author, input(i64::MAX, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidReference { field: "category_id" }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn category_feed_is_newest_first_with_id_tiebreak() {
        let f = fixture().await;
        let repo = PostRepo::new(&f.pool);
        let now = Utc::now();
        let earlier = now - Duration::hours(2);
        let later = now - Duration::hours(1);

        let oldest = repo.create(f.author, input(f.category, earlier)).await.unwrap();
        let first_tie = repo.create(f.author, input(f.category, later)).await.unwrap();
        let second_tie = repo.create(f.author, input(f.category, later)).await.unwrap();

        let page = repo
            .list_public_in_category(f.category, now, Pagination::default())
            .await
            .unwrap();
        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second_tie.id, first_tie.id, oldest.id]);
        assert_eq!(page.total, 3);

        let second = repo
            .list_public_in_category(f.category, now, Pagination::new(2, 2))
            .await
            .unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.items.len(), 1);

        let err = repo
            .list_public_in_category(f.category, now, Pagination::new(5, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "page", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn public_feed_leaves_out_hidden_posts() {
        let f = fixture().await;
        let repo = PostRepo::new(&f.pool);
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let hidden_category = CategoryRepo::new(&f.pool)
            .create(NewCategory {
                title: Title::new("Drafts").unwrap(),
                description: Body::new("description", "Not yet").unwrap(),
                slug: CategorySlug::new(&format!("drafts-{stamp}")).unwrap(),
                is_published: false,
            })
            .await
            .unwrap();

        // Far enough ahead that this run's posts head the feed
        let at = Utc::now() + Duration::days(365 * 100);
        let now = at + Duration::hours(1);

        let visible = repo.create(f.author, input(f.category, at)).await.unwrap();
        let unpublished = repo
            .create(
                f.author,
                PostInput {
                    is_published: false,
                    ..input(f.category, at)
                },
            )
            .await
            .unwrap();
        let scheduled = repo
            .create(f.author, input(f.category, now + Duration::hours(1)))
            .await
            .unwrap();
        let uncategorised = repo
            .create(f.author, input(hidden_category.id, at))
            .await
            .unwrap();

        let feed = repo.list_public(now, Pagination::default()).await.unwrap();
        assert!(feed.items.iter().any(|p| p.id == visible.id));
        for hidden in [&unpublished, &scheduled, &uncategorised] {
            assert!(feed.items.iter().all(|p| p.id != hidden.id));
            assert!(!hidden.is_public(now));
        }

        let in_category = repo
            .list_public_in_category(f.category, now, Pagination::default())
            .await
            .unwrap();
        let ids: Vec<i64> = in_category.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![visible.id]);
    }
}
