//! Post storage: the content store the publishing workflow writes to.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::post::{Post, PostStatus};

/// The post store trait. `PgPostStore` backs it with Postgres,
/// `MemoryPostStore` with a process-local map.
///
/// Carried in `AppState` as `Arc<dyn PostStore>`.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_posts(&self, posts: Vec<Post>) -> Result<Vec<Post>, AppError>;

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// Newest first. `None` lists every status.
    async fn list_posts(&self, status: Option<PostStatus>) -> Result<Vec<Post>, AppError>;

    /// Applies the status to every id that exists and returns the updated
    /// posts. Missing ids are silently skipped; callers check beforehand.
    async fn update_status(
        &self,
        ids: &[Uuid],
        status: PostStatus,
        publish_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryPostStore, used when no DATABASE_URL is configured
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert_posts(&self, posts: Vec<Post>) -> Result<Vec<Post>, AppError> {
        let mut map = self.posts.write().await;
        for post in &posts {
            map.insert(post.id, post.clone());
        }
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_posts(&self, status: Option<PostStatus>) -> Result<Vec<Post>, AppError> {
        let map = self.posts.read().await;
        let mut posts: Vec<Post> = map
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn update_status(
        &self,
        ids: &[Uuid],
        status: PostStatus,
        publish_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, AppError> {
        let mut map = self.posts.write().await;
        let now = Utc::now();

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(post) = map.get_mut(id) {
                post.status = status;
                post.publish_at = publish_at;
                post.updated_at = now;
                updated.push(post.clone());
            }
        }
        Ok(updated)
    }
}
