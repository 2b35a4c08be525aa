use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::post::{Post, PostStatus};
use crate::publishing::workflow::{
    bulk_update_status, publish_articles, PublishRequest, StatusUpdateRequest,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub status: Option<PostStatus>,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub success: bool,
    pub posts: Vec<Post>,
}

impl PostsResponse {
    fn ok(posts: Vec<Post>) -> Json<Self> {
        Json(PostsResponse {
            success: true,
            posts,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: Post,
}

/// POST /api/v1/posts
pub async fn handle_create_posts(
    State(state): State<AppState>,
    AppJson(request): AppJson<PublishRequest>,
) -> Result<Json<PostsResponse>, AppError> {
    let posts = publish_articles(state.posts.as_ref(), request, Utc::now()).await?;
    Ok(PostsResponse::ok(posts))
}

/// GET /api/v1/posts?status=draft|published|scheduled
pub async fn handle_list_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StatusQuery>,
) -> Result<Json<PostsResponse>, AppError> {
    let posts = state.posts.list_posts(query.status).await?;
    Ok(PostsResponse::ok(posts))
}

/// GET /api/v1/posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<PostResponse>, AppError> {
    let post = state
        .posts
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// POST /api/v1/posts/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    AppJson(request): AppJson<StatusUpdateRequest>,
) -> Result<Json<PostsResponse>, AppError> {
    let posts = bulk_update_status(state.posts.as_ref(), request, Utc::now()).await?;
    Ok(PostsResponse::ok(posts))
}
