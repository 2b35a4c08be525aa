//! Publishing workflow: pushes generated articles into the post store and
//! moves posts between draft, published and scheduled.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::article::Article;
use crate::models::post::{Post, PostImage, PostRole, PostStatus};
use crate::publishing::store::PostStore;

/// What the operator asked to do with the posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishAction {
    Draft,
    Publish,
    Schedule,
}

impl PublishAction {
    /// Maps the action to the stored status and timestamp.
    /// Scheduling requires a `publish_at` strictly after `now`.
    pub fn resolve(
        self,
        publish_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(PostStatus, Option<DateTime<Utc>>), AppError> {
        match self {
            PublishAction::Draft => Ok((PostStatus::Draft, None)),
            PublishAction::Publish => Ok((PostStatus::Published, Some(now))),
            PublishAction::Schedule => match publish_at {
                Some(at) if at > now => Ok((PostStatus::Scheduled, Some(at))),
                Some(_) => Err(AppError::Validation(
                    "publishAt must be in the future to schedule".to_string(),
                )),
                None => Err(AppError::Validation(
                    "publishAt is required to schedule".to_string(),
                )),
            },
        }
    }
}

/// One article from the wizard together with the image the operator picked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSelection {
    pub article: Article,
    #[serde(default)]
    pub image: Option<PostImage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub articles: Vec<ArticleSelection>,
    pub action: PublishAction,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
    /// First article is the pillar, the rest are its subtopics.
    #[serde(default)]
    pub as_cluster: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub ids: Vec<Uuid>,
    pub action: PublishAction,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
}

/// Creates one post per selected article with the requested status.
pub async fn publish_articles(
    store: &dyn PostStore,
    request: PublishRequest,
    now: DateTime<Utc>,
) -> Result<Vec<Post>, AppError> {
    if request.articles.is_empty() {
        return Err(AppError::Validation(
            "at least one article is required".to_string(),
        ));
    }
    for (index, selection) in request.articles.iter().enumerate() {
        validate_selection(index, selection)?;
    }

    let (status, publish_at) = request.action.resolve(request.publish_at, now)?;
    let cluster_id = request.as_cluster.then(Uuid::new_v4);

    let posts: Vec<Post> = request
        .articles
        .into_iter()
        .enumerate()
        .map(|(index, ArticleSelection { article, image })| {
            let role = match (cluster_id, index) {
                (None, _) => PostRole::Standalone,
                (Some(_), 0) => PostRole::Pillar,
                (Some(_), _) => PostRole::Subtopic,
            };
            Post {
                id: Uuid::new_v4(),
                title: article.title.trim().to_string(),
                content: article.content,
                meta_description: article.meta_description,
                tags: article.tags.unwrap_or_default(),
                image,
                status,
                publish_at,
                cluster_id,
                role,
                created_at: now,
                updated_at: now,
            }
        })
        .collect();

    let posts = store.insert_posts(posts).await?;
    info!(
        "Pushed {} posts as {} (cluster: {:?})",
        posts.len(),
        status.as_str(),
        cluster_id
    );
    Ok(posts)
}

/// Moves every listed post to the requested status. Fails without changing
/// anything if any id is unknown.
pub async fn bulk_update_status(
    store: &dyn PostStore,
    request: StatusUpdateRequest,
    now: DateTime<Utc>,
) -> Result<Vec<Post>, AppError> {
    if request.ids.is_empty() {
        return Err(AppError::Validation("ids cannot be empty".to_string()));
    }
    let (status, publish_at) = request.action.resolve(request.publish_at, now)?;

    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = request
        .ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    let mut missing = Vec::new();
    for id in &ids {
        if store.get_post(*id).await?.is_none() {
            missing.push(id.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(AppError::NotFound(format!(
            "Posts not found: {}",
            missing.join(", ")
        )));
    }

    let posts = store.update_status(&ids, status, publish_at).await?;
    info!("Moved {} posts to {}", posts.len(), status.as_str());
    Ok(posts)
}

fn validate_selection(index: usize, selection: &ArticleSelection) -> Result<(), AppError> {
    if selection.article.title.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "article {index} has an empty title"
        )));
    }
    if selection.article.content.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "article {index} has empty content"
        )));
    }
    if let Some(image) = &selection.image {
        if !(image.url.starts_with("https://") || image.url.starts_with("http://")) {
            return Err(AppError::Validation(format!(
                "article {index} has an image without an http(s) url"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publishing::store::MemoryPostStore;
    use chrono::Duration;

    fn selection(title: &str) -> ArticleSelection {
        ArticleSelection {
            article: Article {
                tags: Some(vec!["coffee".to_string()]),
                ..Article::new(title, "<p>body</p>")
            },
            image: Some(PostImage {
                url: "https://images.example/beans.jpg".to_string(),
                alt: Some("beans".to_string()),
            }),
        }
    }

    fn publish_request(titles: &[&str], action: PublishAction) -> PublishRequest {
        PublishRequest {
            articles: titles.iter().map(|t| selection(t)).collect(),
            action,
            publish_at: None,
            as_cluster: false,
        }
    }

    #[test]
    fn test_resolve_actions() {
        let now = Utc::now();
        assert_eq!(
            PublishAction::Draft.resolve(Some(now), now).unwrap(),
            (PostStatus::Draft, None)
        );
        assert_eq!(
            PublishAction::Publish.resolve(None, now).unwrap(),
            (PostStatus::Published, Some(now))
        );
        let later = now + Duration::hours(2);
        assert_eq!(
            PublishAction::Schedule.resolve(Some(later), now).unwrap(),
            (PostStatus::Scheduled, Some(later))
        );
    }

    #[test]
    fn test_schedule_requires_future_time() {
        let now = Utc::now();
        assert!(matches!(
            PublishAction::Schedule.resolve(None, now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PublishAction::Schedule.resolve(Some(now), now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PublishAction::Schedule.resolve(Some(now - Duration::minutes(1)), now),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_standalone_drafts() {
        let store = MemoryPostStore::new();
        let now = Utc::now();
        let posts = publish_articles(&store, publish_request(&["A", "B"], PublishAction::Draft), now)
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.status == PostStatus::Draft
            && p.role == PostRole::Standalone
            && p.cluster_id.is_none()
            && p.tags == vec!["coffee".to_string()]));
        assert_eq!(store.list_posts(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_publish_cluster_assigns_roles_and_shared_id() {
        let store = MemoryPostStore::new();
        let mut request = publish_request(&["Pillar", "Sub 1", "Sub 2"], PublishAction::Publish);
        request.as_cluster = true;

        let posts = publish_articles(&store, request, Utc::now()).await.unwrap();

        assert_eq!(posts[0].role, PostRole::Pillar);
        assert!(posts[1..].iter().all(|p| p.role == PostRole::Subtopic));
        assert!(posts[0].cluster_id.is_some());
        assert!(posts.iter().all(|p| p.cluster_id == posts[0].cluster_id));
        assert!(posts.iter().all(|p| p.status == PostStatus::Published));
    }

    #[tokio::test]
    async fn test_publish_rejects_bad_input() {
        let store = MemoryPostStore::new();
        let now = Utc::now();

        let empty = publish_request(&[], PublishAction::Draft);
        assert!(publish_articles(&store, empty, now).await.is_err());

        let blank_title = publish_request(&["  "], PublishAction::Draft);
        assert!(publish_articles(&store, blank_title, now).await.is_err());

        let mut bad_image = publish_request(&["A"], PublishAction::Draft);
        bad_image.articles[0].image = Some(PostImage {
            url: "javascript:alert(1)".to_string(),
            alt: None,
        });
        assert!(publish_articles(&store, bad_image, now).await.is_err());

        let unscheduled = publish_request(&["A"], PublishAction::Schedule);
        assert!(publish_articles(&store, unscheduled, now).await.is_err());

        assert!(store.list_posts(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_schedule_and_publish() {
        let store = MemoryPostStore::new();
        let now = Utc::now();
        let posts = publish_articles(&store, publish_request(&["A", "B"], PublishAction::Draft), now)
            .await
            .unwrap();
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();

        let at = now + Duration::days(3);
        let scheduled = bulk_update_status(
            &store,
            StatusUpdateRequest {
                ids: vec![ids[0], ids[1], ids[0]],
                action: PublishAction::Schedule,
                publish_at: Some(at),
            },
            now,
        )
        .await
        .unwrap();
        assert_eq!(scheduled.len(), 2, "duplicate ids are collapsed");
        assert!(scheduled
            .iter()
            .all(|p| p.status == PostStatus::Scheduled && p.publish_at == Some(at)));

        let back_to_draft = bulk_update_status(
            &store,
            StatusUpdateRequest {
                ids: vec![ids[1]],
                action: PublishAction::Draft,
                publish_at: None,
            },
            now,
        )
        .await
        .unwrap();
        assert_eq!(back_to_draft[0].status, PostStatus::Draft);
        assert_eq!(back_to_draft[0].publish_at, None);
    }

    #[tokio::test]
    async fn test_bulk_update_with_unknown_id_changes_nothing() {
        let store = MemoryPostStore::new();
        let now = Utc::now();
        let posts = publish_articles(&store, publish_request(&["A"], PublishAction::Draft), now)
            .await
            .unwrap();

        let err = bulk_update_status(
            &store,
            StatusUpdateRequest {
                ids: vec![posts[0].id, Uuid::new_v4()],
                action: PublishAction::Publish,
                publish_at: None,
            },
            now,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        let stored = store.get_post(posts[0].id).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_bulk_update_requires_ids() {
        let store = MemoryPostStore::new();
        let err = bulk_update_status(
            &store,
            StatusUpdateRequest {
                ids: vec![],
                action: PublishAction::Publish,
                publish_at: None,
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
