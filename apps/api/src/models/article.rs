use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single generated blog article. `content` is an HTML fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Only set for articles recovered by manual extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            meta_description: None,
            tags: None,
        }
    }
}

/// A pillar article plus its ordered subtopic articles.
///
/// The pillar is always present; the subtopic count is a target handed to the
/// model and may come back short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub pillar: Article,
    pub subtopics: Vec<Article>,
}

/// Older response shape still consumed by some clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCluster {
    pub main_topic: String,
    pub subtopics: Vec<Article>,
}

impl From<Cluster> for LegacyCluster {
    fn from(cluster: Cluster) -> Self {
        LegacyCluster {
            main_topic: cluster.pillar.title,
            subtopics: cluster.subtopics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_serializes_camel_case_and_skips_empty_fields() {
        let mut article = Article::new("Title", "<p>Body</p>");
        article.meta_description = Some("Short summary".to_string());

        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["metaDescription"], "Short summary");
        assert!(value.get("tags").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_legacy_cluster_uses_pillar_title_as_main_topic() {
        let cluster = Cluster {
            pillar: Article::new("Coffee Grinders", "<p>All about grinders</p>"),
            subtopics: vec![Article::new("Burr vs Blade", "<p>...</p>")],
        };

        let legacy = LegacyCluster::from(cluster);
        assert_eq!(legacy.main_topic, "Coffee Grinders");
        assert_eq!(legacy.subtopics.len(), 1);

        let value = serde_json::to_value(&legacy).unwrap();
        assert_eq!(value["mainTopic"], "Coffee Grinders");
    }
}
