//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::generation::generator::{generate_article, generate_cluster};
use crate::generation::request::GenerationRequest;
use crate::models::article::{Article, Cluster, LegacyCluster};
use crate::normalizer::{normalize, Mode, NormalizationResult, Normalized, Strategy};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Which cluster shape the caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterShape {
    #[default]
    Pillar,
    Legacy,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterQuery {
    #[serde(default)]
    pub shape: ClusterShape,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub text: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterBody {
    Pillar(Cluster),
    Legacy(LegacyCluster),
}

impl ClusterBody {
    fn new(cluster: Cluster, shape: ClusterShape) -> Self {
        match shape {
            ClusterShape::Pillar => ClusterBody::Pillar(cluster),
            ClusterShape::Legacy => ClusterBody::Legacy(cluster.into()),
        }
    }
}

/// Wire form of a `NormalizationResult`:
/// `{success: true, article|cluster, strategy}` or
/// `{success: false, message, degraded?, cluster?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set when `cluster` is placeholder content standing in for a failure.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl GenerationResponse {
    pub fn from_result(result: NormalizationResult, shape: ClusterShape) -> Self {
        let empty = GenerationResponse {
            success: false,
            article: None,
            cluster: None,
            strategy: None,
            message: None,
            degraded: false,
        };

        match result {
            NormalizationResult::Success { value, strategy } => {
                let (article, cluster) = match value {
                    Normalized::Article(article) => (Some(article), None),
                    Normalized::Cluster(cluster) => (None, Some(ClusterBody::new(cluster, shape))),
                };
                GenerationResponse {
                    success: true,
                    article,
                    cluster,
                    strategy: Some(strategy),
                    ..empty
                }
            }
            NormalizationResult::Failure {
                reason,
                placeholder,
            } => GenerationResponse {
                degraded: placeholder.is_some(),
                cluster: placeholder.map(|c| ClusterBody::new(c, shape)),
                message: Some(reason),
                ..empty
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/articles/generate
///
/// Generates one SEO article. Parse failures come back as `success: false`
/// with HTTP 200; validation and upstream failures are `AppError`s.
pub async fn handle_generate_article(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerationRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let result = generate_article(state.llm.as_ref(), &request).await?;
    Ok(Json(GenerationResponse::from_result(
        result,
        ClusterShape::default(),
    )))
}

/// POST /api/v1/clusters/generate?shape=pillar|legacy
///
/// Generates a pillar article plus subtopics. On total parse failure the
/// response is `success: false, degraded: true` with a placeholder cluster.
pub async fn handle_generate_cluster(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ClusterQuery>,
    AppJson(request): AppJson<GenerationRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let result = generate_cluster(state.llm.as_ref(), &request).await?;
    Ok(Json(GenerationResponse::from_result(result, query.shape)))
}

/// POST /api/v1/normalize
///
/// Runs the normalizer on caller-supplied text. Useful for re-parsing a
/// stored completion without paying for another model call.
pub async fn handle_normalize(
    AppQuery(query): AppQuery<ClusterQuery>,
    AppJson(request): AppJson<NormalizeRequest>,
) -> Json<GenerationResponse> {
    let result = normalize(&request.text, request.mode, &request.topic);
    Json(GenerationResponse::from_result(result, query.shape))
}
