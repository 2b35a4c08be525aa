//! Deterministic stand-in cluster, built from the topic string alone.
//!
//! Only ever returned alongside a failure (`degraded: true`), never as a success.

use crate::models::article::{Article, Cluster};

pub const MIN_SUBTOPICS: usize = 3;
pub const MAX_SUBTOPICS: usize = 7;
pub const DEFAULT_SUBTOPICS: usize = 5;

const SUBTOPIC_TEMPLATES: [(&str, &str); MAX_SUBTOPICS] = [
    (
        "Getting Started with {topic}",
        "A beginner-friendly introduction to {topic}: what it is, who it is for, and what to look for first.",
    ),
    (
        "Top Benefits of {topic}",
        "The main reasons shoppers choose {topic}, and how those benefits show up in everyday use.",
    ),
    (
        "How to Choose the Right {topic}",
        "Key features, sizes, and price points to compare before buying {topic}.",
    ),
    (
        "Common Mistakes to Avoid with {topic}",
        "Frequent pitfalls people run into with {topic}, and simple ways to avoid them.",
    ),
    (
        "{topic}: Frequently Asked Questions",
        "Short answers to the questions customers ask most often about {topic}.",
    ),
    (
        "Caring for and Maintaining {topic}",
        "Practical care and maintenance tips that help {topic} last longer.",
    ),
    (
        "Expert Tips for Getting More from {topic}",
        "Advanced advice for getting the most value out of {topic}.",
    ),
];

/// Builds the placeholder cluster. `subtopic_count` is clamped to 3..=7.
pub fn placeholder_cluster(topic: &str, subtopic_count: usize) -> Cluster {
    let topic = match topic.trim() {
        "" => "Your Topic",
        t => t,
    };
    let tags = Some(vec![topic.to_string()]);
    let count = subtopic_count.clamp(MIN_SUBTOPICS, MAX_SUBTOPICS);

    let subtopics = SUBTOPIC_TEMPLATES
        .iter()
        .take(count)
        .map(|(title, summary)| Article {
            meta_description: Some(summary.replace("{topic}", topic)),
            tags: tags.clone(),
            ..Article::new(
                title.replace("{topic}", topic),
                format!("<p>{}</p>", summary.replace("{topic}", topic)),
            )
        })
        .collect();

    Cluster {
        pillar: Article {
            meta_description: Some(format!("Everything you need to know about {topic}.")),
            tags,
            ..Article::new(
                format!("The Complete Guide to {topic}"),
                format!(
                    "<h2>What Is {topic}?</h2>\n<p>This guide covers the essentials of {topic} \
                     and links to in-depth articles on each subtopic.</p>"
                ),
            )
        },
        subtopics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_deterministic() {
        assert_eq!(
            placeholder_cluster("French Presses", 5),
            placeholder_cluster("French Presses", 5)
        );
    }

    #[test]
    fn test_placeholder_uses_topic_everywhere() {
        let cluster = placeholder_cluster("  French Presses ", 4);
        assert_eq!(cluster.pillar.title, "The Complete Guide to French Presses");
        assert_eq!(cluster.subtopics.len(), 4);
        assert_eq!(cluster.subtopics[0].title, "Getting Started with French Presses");
        assert!(cluster
            .subtopics
            .iter()
            .all(|a| a.tags == Some(vec!["French Presses".to_string()]) && a.id.is_none()));
    }

    #[test]
    fn test_placeholder_count_is_clamped() {
        assert_eq!(placeholder_cluster("x", 0).subtopics.len(), MIN_SUBTOPICS);
        assert_eq!(placeholder_cluster("x", 50).subtopics.len(), MAX_SUBTOPICS);
    }

    #[test]
    fn test_blank_topic_gets_generic_title() {
        let cluster = placeholder_cluster("   ", DEFAULT_SUBTOPICS);
        assert_eq!(cluster.pillar.title, "The Complete Guide to Your Topic");
    }
}
