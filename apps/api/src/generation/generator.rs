//! Content Generation: orchestrates prompt → completion → normalization.
//!
//! Flow: validate request → build prompt → LLM complete → normalize.
//! Upstream failures become `AppError::Llm`; parse failures stay inside the
//! `NormalizationResult` so the caller can report them as `success: false`.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{
    ARTICLE_PROMPT_TEMPLATE, ARTICLE_SYSTEM, CLUSTER_PROMPT_TEMPLATE, CLUSTER_SYSTEM,
};
use crate::generation::request::{GenerationOptions, GenerationRequest, Product};
use crate::llm_client::prompts::{HTML_CONTENT_INSTRUCTION, JSON_ONLY_SYSTEM, SEO_INSTRUCTION};
use crate::llm_client::CompletionProvider;
use crate::normalizer::{normalize_with_target, Mode, NormalizationResult};

// ────────────────────────────────────────────────────────────────────────────
// Pipelines
// ────────────────────────────────────────────────────────────────────────────

/// Generates a single SEO article for the request topic.
pub async fn generate_article(
    llm: &dyn CompletionProvider,
    request: &GenerationRequest,
) -> Result<NormalizationResult, AppError> {
    request.validate()?;

    info!("Generating article for topic '{}'", request.topic);
    let prompt = build_article_prompt(request);
    let raw = complete(llm, ARTICLE_SYSTEM, &prompt).await?;

    let result = normalize_with_target(
        &raw,
        Mode::Single,
        &request.topic,
        request.options.subtopic_count,
    );
    log_outcome(&request.topic, &result);
    Ok(result)
}

/// Generates a pillar article plus `subtopic_count` subtopic articles.
pub async fn generate_cluster(
    llm: &dyn CompletionProvider,
    request: &GenerationRequest,
) -> Result<NormalizationResult, AppError> {
    request.validate_cluster()?;

    info!(
        "Generating cluster for topic '{}' with {} subtopics",
        request.topic, request.options.subtopic_count
    );
    let prompt = build_cluster_prompt(request);
    let raw = complete(llm, CLUSTER_SYSTEM, &prompt).await?;

    let result = normalize_with_target(
        &raw,
        Mode::Cluster,
        &request.topic,
        request.options.subtopic_count,
    );
    log_outcome(&request.topic, &result);
    Ok(result)
}

async fn complete(
    llm: &dyn CompletionProvider,
    system: &str,
    prompt: &str,
) -> Result<String, AppError> {
    // Logged once, when the AppError is rendered.
    llm.complete(system, prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Generation LLM call failed: {e}")))
}

fn log_outcome(topic: &str, result: &NormalizationResult) {
    match result {
        NormalizationResult::Success { strategy, .. } => {
            info!("Generated content for '{topic}' (strategy: {strategy:?})")
        }
        NormalizationResult::Failure { reason, placeholder } => warn!(
            "Generation for '{topic}' could not be normalized: {reason} (placeholder: {})",
            placeholder.is_some()
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt building
// ────────────────────────────────────────────────────────────────────────────

/// Builds the single-article prompt by filling the template.
pub fn build_article_prompt(request: &GenerationRequest) -> String {
    fill_common(ARTICLE_PROMPT_TEMPLATE, request)
}

/// Builds the cluster prompt by filling the template.
pub fn build_cluster_prompt(request: &GenerationRequest) -> String {
    fill_common(CLUSTER_PROMPT_TEMPLATE, request)
        .replace("{subtopic_count}", &request.options.subtopic_count.to_string())
}

fn fill_common(template: &str, request: &GenerationRequest) -> String {
    template
        .replace("{json_instruction}", JSON_ONLY_SYSTEM)
        .replace("{html_instruction}", HTML_CONTENT_INSTRUCTION)
        .replace("{seo_instruction}", SEO_INSTRUCTION)
        .replace("{keywords}", &keyword_block(&request.keywords))
        .replace("{products}", &product_block(&request.products))
        .replace("{style_guide}", &style_guide(&request.options))
        .replace("{structure_guide}", &structure_guide(&request.options))
        // Topic last so user text containing "{...}" is never re-substituted.
        .replace("{topic}", request.topic.trim())
}

fn keyword_block(keywords: &[String]) -> String {
    if keywords.is_empty() {
        return "- (none given; choose keywords that fit the topic)".to_string();
    }
    keywords
        .iter()
        .enumerate()
        .map(|(i, k)| {
            let role = if i == 0 { "primary" } else { "secondary" };
            format!("- {} ({role})", k.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn product_block(products: &[Product]) -> String {
    if products.is_empty() {
        return "- (none; do not recommend specific products)".to_string();
    }
    products
        .iter()
        .map(|p| {
            let mut line = format!("- [{}] {}", p.id, p.title);
            if let Some(price) = p.price.as_deref().filter(|s| !s.trim().is_empty()) {
                line.push_str(&format!(" ({price})"));
            }
            if let Some(desc) = p.description.as_deref().filter(|s| !s.trim().is_empty()) {
                let short: String = desc.trim().chars().take(300).collect();
                line.push_str(&format!(": {short}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn style_guide(options: &GenerationOptions) -> String {
    let mut lines = vec![
        format!("- Tone of voice: {}", options.tone_of_voice),
        format!("- Writing perspective: {}", options.writing_perspective),
        format!("- Writing style: {}", options.style),
        format!("- Introduction style: {}", options.intro_style),
        format!("- Target buyer: {}", options.buyer_profile),
    ];
    if let Some(copywriter) = options.copywriter.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("- Write in the manner of: {copywriter}"));
    }
    if let Some(gender) = options.gender.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("- Audience gender: {gender}"));
    }
    lines.join("\n")
}

fn structure_guide(options: &GenerationOptions) -> String {
    let mut lines = vec![
        format!(
            "- Length: about {} words",
            options.article_length.target_words()
        ),
        format!("- Use exactly {} <h2> sections", options.num_h2s),
        format!("- End with an FAQ section ({})", options.faq_style),
    ];
    lines.push(if options.enable_tables {
        "- Include at least one comparison <table>".to_string()
    } else {
        "- Do NOT use tables".to_string()
    });
    lines.push(if options.enable_lists {
        "- Use bulleted or numbered lists where they help scanning".to_string()
    } else {
        "- Do NOT use lists".to_string()
    });
    if options.enable_citations {
        lines.push(
            "- Cite reputable sources inline with <a href> links; never invent URLs".to_string(),
        );
    }
    lines.join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::request::ArticleLength;
    use crate::llm_client::LlmError;
    use crate::normalizer::{Normalized, Strategy};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned completion and records the prompts it was given.
    struct ScriptedLlm {
        reply: Result<String, ()>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedLlm {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            self.reply.clone().map_err(|_| LlmError::Api {
                status: 401,
                message: "invalid x-api-key".to_string(),
            })
        }
    }

    fn request(topic: &str) -> GenerationRequest {
        serde_json::from_value(serde_json::json!({ "topic": topic })).unwrap()
    }

    #[test]
    fn test_article_prompt_includes_request_details() {
        let mut req = request("Cold brew at home");
        req.keywords = vec!["cold brew".to_string(), "coffee concentrate".to_string()];
        req.products = vec![Product {
            id: "sku-42".to_string(),
            title: "Cold Brew Jar".to_string(),
            description: Some("1.5L glass jar with mesh filter".to_string()),
            price: Some("29.00".to_string()),
        }];
        req.options.article_length = ArticleLength::Short;
        req.options.num_h2s = 4;
        req.options.enable_tables = true;

        let prompt = build_article_prompt(&req);
        assert!(prompt.contains("Write a blog article about: Cold brew at home"));
        assert!(prompt.contains("- cold brew (primary)"));
        assert!(prompt.contains("- coffee concentrate (secondary)"));
        assert!(prompt.contains("[sku-42] Cold Brew Jar"));
        assert!(prompt.contains("about 800 words"));
        assert!(prompt.contains("exactly 4 <h2> sections"));
        assert!(prompt.contains("comparison <table>"));
        assert!(prompt.contains("valid JSON only"));
        assert!(!prompt.contains("{topic}"));
        assert!(!prompt.contains("{keywords}"));
    }

    #[test]
    fn test_cluster_prompt_has_subtopic_count() {
        let mut req = request("Espresso");
        req.options.subtopic_count = 6;
        let prompt = build_cluster_prompt(&req);
        assert!(prompt.contains("EXACTLY 6"));
        assert!(!prompt.contains("{subtopic_count}"));
    }

    #[test]
    fn test_topic_with_braces_is_not_resubstituted() {
        let req = request("Why {products} matter");
        let prompt = build_article_prompt(&req);
        assert!(prompt.contains("Why {products} matter"));
    }

    #[tokio::test]
    async fn test_generate_article_normalizes_fenced_reply() {
        let llm = ScriptedLlm::replying(
            "```json\n{\"title\": \"Cold Brew 101\", \"content\": \"<p>Steep</p>\"}\n```",
        );
        let result = generate_article(&llm, &request("Cold brew")).await.unwrap();

        match result {
            NormalizationResult::Success {
                value: Normalized::Article(article),
                strategy,
            } => {
                assert_eq!(article.title, "Cold Brew 101");
                assert_eq!(strategy, Strategy::Direct);
            }
            other => panic!("expected article, got {other:?}"),
        }

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, ARTICLE_SYSTEM);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_llm() {
        let llm = ScriptedLlm::replying("{}");
        let err = generate_article(&llm, &request("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(llm.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_llm_error() {
        let llm = ScriptedLlm::failing();
        let err = generate_cluster(&llm, &request("Tea")).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_cluster_garbage_reply_is_degraded_failure() {
        let llm = ScriptedLlm::replying("Sorry, I cannot do that.");
        let mut req = request("Tea");
        req.options.subtopic_count = 4;

        match generate_cluster(&llm, &req).await.unwrap() {
            NormalizationResult::Failure {
                placeholder: Some(cluster),
                ..
            } => assert_eq!(cluster.subtopics.len(), 4),
            other => panic!("expected degraded failure, got {other:?}"),
        }
    }
}
