//! Postgres-backed post store.
//!
//! Expects the `blog_posts` table from `migrations/0001_blog_posts.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::post::{Post, PostRow, PostStatus};
use crate::publishing::store::PostStore;

const POST_COLUMNS: &str = "id, title, content, meta_description, tags, image_url, image_alt, \
    status, publish_at, cluster_id, role, created_at, updated_at";

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, AppError> {
    rows.into_iter()
        .map(|row| Post::try_from(row).map_err(|e| AppError::Internal(anyhow::anyhow!(e))))
        .collect()
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_posts(&self, posts: Vec<Post>) -> Result<Vec<Post>, AppError> {
        let mut tx = self.pool.begin().await?;

        for post in &posts {
            let (image_url, image_alt) = match &post.image {
                Some(image) => (Some(image.url.as_str()), image.alt.as_deref()),
                None => (None, None),
            };

            sqlx::query(
                r#"
                INSERT INTO blog_posts
                    (id, title, content, meta_description, tags, image_url, image_alt,
                     status, publish_at, cluster_id, role, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(post.id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.meta_description)
            .bind(&post.tags)
            .bind(image_url)
            .bind(image_alt)
            .bind(post.status.as_str())
            .bind(post.publish_at)
            .bind(post.cluster_id)
            .bind(post.role.as_str())
            .bind(post.created_at)
            .bind(post.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Inserted {} blog posts", posts.len());
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Post::try_from(r).map_err(|e| AppError::Internal(anyhow::anyhow!(e))))
            .transpose()
    }

    async fn list_posts(&self, status: Option<PostStatus>) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC, id"
        ))
        .bind(status.map(PostStatus::as_str))
        .fetch_all(&self.pool)
        .await?;

        into_posts(rows)
    }

    async fn update_status(
        &self,
        ids: &[Uuid],
        status: PostStatus,
        publish_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE blog_posts SET status = $2, publish_at = $3, updated_at = NOW() \
             WHERE id = ANY($1) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(ids)
        .bind(status.as_str())
        .bind(publish_at)
        .fetch_all(&self.pool)
        .await?;

        info!("Updated {} blog posts to status {}", rows.len(), status.as_str());
        into_posts(rows)
    }
}
