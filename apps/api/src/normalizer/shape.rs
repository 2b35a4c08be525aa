//! Shape coercion: maps a parsed `serde_json::Value` onto `Article` / `Cluster`.
//!
//! Models drift between field names (`content` vs `body`, `metaDescription`
//! vs `meta_description`) and wrappers (`{"article": {...}}`), so coercion is
//! done by hand rather than through a strict `Deserialize`.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::article::{Article, Cluster};

#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),

    #[error("no usable articles in array")]
    NoArticles,
}

const TITLE_KEYS: &[&str] = &["title", "headline", "name"];
const CONTENT_KEYS: &[&str] = &["content", "body", "html"];
const META_KEYS: &[&str] = &["metaDescription", "meta_description", "description"];
const TAG_KEYS: &[&str] = &["tags", "keywords"];
const SUBTOPIC_KEYS: &[&str] = &["subtopics", "subTopics", "sub_topics", "articles"];
const MAIN_TOPIC_KEYS: &[&str] = &["mainTopic", "main_topic"];

/// Coerces a value into a single article. Accepts a bare article object,
/// one wrapped under `article`, or an array whose first element is one.
pub fn article_from_value(value: &Value) -> Result<Article, ShapeError> {
    match value {
        Value::Object(map) => match map.get("article") {
            Some(inner @ Value::Object(_)) => article_from_value(inner),
            _ => article_from_map(map),
        },
        Value::Array(items) => items
            .first()
            .map(article_from_value)
            .unwrap_or(Err(ShapeError::NoArticles)),
        _ => Err(ShapeError::NotAnObject),
    }
}

/// Coerces a value into a cluster.
///
/// Accepted shapes: `{pillar, subtopics}`, the legacy `{mainTopic, subtopics}`,
/// either wrapped under `cluster`, or a bare array of articles (all treated as
/// subtopics, with a pillar synthesized from `topic`).
pub fn cluster_from_value(value: &Value, topic: &str) -> Result<Cluster, ShapeError> {
    match value {
        Value::Object(map) => {
            if let Some(inner @ Value::Object(_)) = map.get("cluster") {
                return cluster_from_value(inner, topic);
            }

            let subtopics = match first_present(map, SUBTOPIC_KEYS) {
                Some(Value::Array(items)) => subtopics_from_items(items),
                _ => return Err(ShapeError::MissingField("subtopics")),
            };

            let pillar = match map.get("pillar") {
                Some(pillar) => article_from_value(pillar)?,
                None => match first_string(map, MAIN_TOPIC_KEYS) {
                    Some(main_topic) => synthesized_pillar(&main_topic),
                    None => return Err(ShapeError::MissingField("pillar")),
                },
            };

            Ok(Cluster { pillar, subtopics })
        }
        Value::Array(items) => {
            let subtopics = subtopics_from_items(items);
            if subtopics.is_empty() {
                return Err(ShapeError::NoArticles);
            }
            Ok(Cluster {
                pillar: synthesized_pillar(topic),
                subtopics,
            })
        }
        _ => Err(ShapeError::NotAnObject),
    }
}

/// The trimmed topic, or "Untitled" when it is blank.
pub fn topic_or_untitled(topic: &str) -> &str {
    match topic.trim() {
        "" => "Untitled",
        t => t,
    }
}

/// A pillar built from a topic string alone, for shapes that carry no pillar article.
pub fn synthesized_pillar(topic: &str) -> Article {
    let title = topic_or_untitled(topic).to_string();
    Article {
        tags: Some(vec![title.clone()]),
        ..Article::new(title, String::new())
    }
}

fn subtopics_from_items(items: &[Value]) -> Vec<Article> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match article_from_value(item) {
            Ok(article) => Some(article),
            Err(e) => {
                warn!("Dropping subtopic {index} with unusable shape: {e}");
                None
            }
        })
        .collect()
}

fn article_from_map(map: &Map<String, Value>) -> Result<Article, ShapeError> {
    let title = first_string(map, TITLE_KEYS).ok_or(ShapeError::MissingField("title"))?;
    let content = first_string(map, CONTENT_KEYS).ok_or(ShapeError::MissingField("content"))?;

    Ok(Article {
        id: map
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok()),
        title,
        content,
        meta_description: first_string(map, META_KEYS),
        tags: first_present(map, TAG_KEYS).and_then(tags_from_value),
    })
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// First non-blank string among `keys`, trimmed.
fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Tags arrive as a string array or as one comma-separated string.
fn tags_from_value(value: &Value) -> Option<Vec<String>> {
    let tags: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };
    Some(tags)
}
