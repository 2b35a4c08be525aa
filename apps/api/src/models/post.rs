use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Where a post sits in the publishing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "scheduled" => Ok(PostStatus::Scheduled),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// How a post relates to the cluster it was pushed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostRole {
    Standalone,
    Pillar,
    Subtopic,
}

impl PostRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PostRole::Standalone => "standalone",
            PostRole::Pillar => "pillar",
            PostRole::Subtopic => "subtopic",
        }
    }
}

impl FromStr for PostRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standalone" => Ok(PostRole::Standalone),
            "pillar" => Ok(PostRole::Pillar),
            "subtopic" => Ok(PostRole::Subtopic),
            other => Err(format!("unknown post role '{other}'")),
        }
    }
}

/// The stock or product image chosen for a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A blog post as the API exposes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub image: Option<PostImage>,
    pub status: PostStatus,
    /// Publication time for published posts, target time for scheduled ones.
    pub publish_at: Option<DateTime<Utc>>,
    pub cluster_id: Option<Uuid>,
    pub role: PostRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `blog_posts` table.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub status: String,
    pub publish_at: Option<DateTime<Utc>>,
    pub cluster_id: Option<Uuid>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = String;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.id,
            title: row.title,
            content: row.content,
            meta_description: row.meta_description,
            tags: row.tags,
            image: row.image_url.map(|url| PostImage {
                url,
                alt: row.image_alt,
            }),
            status: row.status.parse()?,
            publish_at: row.publish_at,
            cluster_id: row.cluster_id,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> PostRow {
        let now = Utc::now();
        PostRow {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            content: "<p>c</p>".to_string(),
            meta_description: None,
            tags: vec!["a".to_string()],
            image_url: Some("https://img.example/1.jpg".to_string()),
            image_alt: Some("mug".to_string()),
            status: status.to_string(),
            publish_at: None,
            cluster_id: None,
            role: "standalone".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Published, PostStatus::Scheduled] {
            assert_eq!(status.as_str().parse::<PostStatus>(), Ok(status));
        }
        assert!("archived".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_row_converts_to_post() {
        let post = Post::try_from(row("scheduled")).unwrap();
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.role, PostRole::Standalone);
        assert_eq!(
            post.image,
            Some(PostImage {
                url: "https://img.example/1.jpg".to_string(),
                alt: Some("mug".to_string()),
            })
        );
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        assert!(Post::try_from(row("archived")).is_err());
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = Post::try_from(row("draft")).unwrap();
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["status"], "draft");
        assert!(value.get("publishAt").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["image"]["alt"], "mug");
    }
}
