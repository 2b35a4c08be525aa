pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::publishing::handlers as publishing;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route(
            "/api/v1/articles/generate",
            post(generation::handle_generate_article),
        )
        .route(
            "/api/v1/clusters/generate",
            post(generation::handle_generate_cluster),
        )
        .route("/api/v1/normalize", post(generation::handle_normalize))
        // Publishing API
        .route(
            "/api/v1/posts",
            post(publishing::handle_create_posts).get(publishing::handle_list_posts),
        )
        .route("/api/v1/posts/status", post(publishing::handle_update_status))
        .route("/api/v1/posts/:id", get(publishing::handle_get_post))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{CompletionProvider, LlmError};
    use crate::publishing::store::MemoryPostStore;

    /// Replies with the same canned text to every prompt.
    struct CannedLlm(Option<&'static str>);

    #[async_trait]
    impl CompletionProvider for CannedLlm {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            match self.0 {
                Some(text) => Ok(text.to_string()),
                None => Err(LlmError::RateLimited { retries: 2 }),
            }
        }
    }

    fn app(reply: Option<&'static str>) -> Router {
        build_router(AppState {
            llm: Arc::new(CannedLlm(reply)),
            posts: Arc::new(MemoryPostStore::new()),
            config: Config {
                database_url: None,
                anthropic_api_key: "test-key".to_string(),
                port: 0,
                rust_log: "debug".to_string(),
            },
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(None), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "storefront-api");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_generate_article_from_fenced_reply() {
        let app = app(Some(
            "Sure!\n```json\n{\"title\": \"Brewing Basics\", \"content\": \"<p>Grind fresh.</p>\"}\n```",
        ));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/articles/generate",
            Some(json!({"topic": "coffee brewing"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["strategy"], "direct");
        assert_eq!(body["article"]["title"], "Brewing Basics");
    }

    #[tokio::test]
    async fn test_generate_article_rejects_blank_topic() {
        let (status, body) = send(
            &app(Some("{}")),
            "POST",
            "/api/v1/articles/generate",
            Some(json!({"topic": "  "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_envelope() {
        let app = app(Some("{}"));
        let cases = [
            ("POST", "/api/v1/articles/generate", Some(json!({}))),
            (
                "POST",
                "/api/v1/articles/generate",
                Some(json!({"topic": "tea", "options": {"articleLength": "epic"}})),
            ),
            ("POST", "/api/v1/clusters/generate?shape=bogus", Some(json!({"topic": "tea"}))),
            ("POST", "/api/v1/posts/status", Some(json!({"action": "publish"}))),
            ("GET", "/api/v1/posts?status=archived", None),
            ("GET", "/api/v1/posts/not-a-uuid", None),
        ];

        for (method, uri, body) in cases {
            let (status, value) = send(&app, method, uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            assert_eq!(value["success"], false, "{method} {uri}");
            assert_eq!(value["code"], "VALIDATION_ERROR", "{method} {uri}");
            assert!(!value["message"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_topic_message_names_the_field() {
        let (_, body) = send(&app(Some("{}")), "POST", "/api/v1/articles/generate", Some(json!({}))).await;
        assert!(body["message"].as_str().unwrap().contains("topic"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (status, body) = send(
            &app(None),
            "POST",
            "/api/v1/articles/generate",
            Some(json!({"topic": "coffee"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "An AI processing error occurred");
    }

    #[tokio::test]
    async fn test_unparseable_cluster_reply_is_degraded() {
        let (status, body) = send(
            &app(Some("I'm sorry, I can't help with that.")),
            "POST",
            "/api/v1/clusters/generate",
            Some(json!({"topic": "Tea", "options": {"subtopicCount": 3}})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["degraded"], true);
        assert_eq!(body["cluster"]["subtopics"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_legacy_cluster_shape_via_query() {
        let app = app(Some(
            r#"{"pillar": {"title": "Tea 101", "content": "<p>p</p>"},
                "subtopics": [{"title": "Green", "content": "<p>g</p>"}]}"#,
        ));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/clusters/generate?shape=legacy",
            Some(json!({"topic": "Tea"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cluster"]["mainTopic"], "Tea 101");
        assert_eq!(body["cluster"]["subtopics"][0]["title"], "Green");
    }

    #[tokio::test]
    async fn test_normalize_endpoint() {
        let (status, body) = send(
            &app(None),
            "POST",
            "/api/v1/normalize",
            Some(json!({"text": "{title: 'A', content: 'x',}"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["strategy"], "repaired");
        assert_eq!(body["article"]["title"], "A");
    }

    #[tokio::test]
    async fn test_post_lifecycle() {
        let app = app(None);

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/posts",
            Some(json!({
                "articles": [
                    {"article": {"title": "Pillar", "content": "<p>p</p>"}},
                    {"article": {"title": "Sub", "content": "<p>s</p>"},
                     "image": {"url": "https://img.example/s.jpg", "alt": "s"}}
                ],
                "action": "draft",
                "asCluster": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let posts = created["posts"].as_array().unwrap();
        assert_eq!(posts[0]["role"], "pillar");
        assert_eq!(posts[1]["role"], "subtopic");
        assert_eq!(posts[1]["image"]["url"], "https://img.example/s.jpg");
        let pillar_id = posts[0]["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            "POST",
            "/api/v1/posts/status",
            Some(json!({"ids": [pillar_id], "action": "publish"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["posts"][0]["status"], "published");

        let (_, published) = send(&app, "GET", "/api/v1/posts?status=published", None).await;
        assert_eq!(published["posts"].as_array().unwrap().len(), 1);

        let (status, single) = send(&app, "GET", &format!("/api/v1/posts/{pillar_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(single["post"]["title"], "Pillar");
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let app = app(None);
        let missing = uuid::Uuid::new_v4();

        let (status, body) = send(&app, "GET", &format!("/api/v1/posts/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/posts/status",
            Some(json!({"ids": [missing], "action": "publish"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains(&missing.to_string()));
    }
}
