//! Response Normalizer: turns raw model output into an `Article` or `Cluster`.
//!
//! Pipeline, each step tried only when the previous one fails:
//!   1. extract a JSON candidate (fence, bracket span, or whole text)
//!   2. strict `serde_json` parse + shape coercion
//!   3. tolerant repair (see `lenient`) + strict re-parse + shape coercion
//!   4. manual extraction from "Article N:" style marker lines
//!
//! Pure and synchronous: no I/O, no shared state, never panics on bad input.

pub mod extract;
pub mod lenient;
pub mod manual;
pub mod placeholder;
pub mod shape;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::article::{Article, Cluster};
use crate::normalizer::lenient::{repair, RepairError};
use crate::normalizer::placeholder::{placeholder_cluster, DEFAULT_SUBTOPICS};
use crate::normalizer::shape::{article_from_value, cluster_from_value, ShapeError};

/// Reason reported when every strategy is exhausted.
pub const FAILURE_MESSAGE: &str = "Could not extract structured content from the model response";

/// The shape the caller expects back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Single,
    Cluster,
}

/// Which recovery step produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Direct,
    Repaired,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Article(Article),
    Cluster(Cluster),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationResult {
    Success {
        value: Normalized,
        strategy: Strategy,
    },
    /// `placeholder` is set in cluster mode only; callers decide whether to show it.
    Failure {
        reason: String,
        placeholder: Option<Cluster>,
    },
}

/// Normalizes with the default placeholder size.
pub fn normalize(raw: &str, mode: Mode, topic: &str) -> NormalizationResult {
    normalize_with_target(raw, mode, topic, DEFAULT_SUBTOPICS)
}

/// Normalizes `raw`; `subtopic_target` only sizes the placeholder on failure.
pub fn normalize_with_target(
    raw: &str,
    mode: Mode,
    topic: &str,
    subtopic_target: usize,
) -> NormalizationResult {
    let candidate = extract::extract_candidate(raw);

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => match coerce(&value, mode, topic) {
            Ok(normalized) => return success(normalized, Strategy::Direct),
            Err(e) => warn!("Direct parse succeeded but shape was unusable: {e}"),
        },
        Err(e) => debug!("Direct parse failed: {e}"),
    }

    match repaired_value(candidate) {
        Ok(value) => match coerce(&value, mode, topic) {
            Ok(normalized) => return success(normalized, Strategy::Repaired),
            Err(e) => warn!("Repaired JSON has an unusable shape: {e}"),
        },
        Err(e) => warn!("JSON repair failed: {e}"),
    }

    let manual = match mode {
        Mode::Single => manual::extract_article(raw, topic).map(Normalized::Article),
        Mode::Cluster => manual::extract_cluster(raw, topic).map(Normalized::Cluster),
    };
    if let Some(normalized) = manual {
        return success(normalized, Strategy::Manual);
    }

    warn!("All normalization strategies exhausted ({} chars of input)", raw.len());
    NormalizationResult::Failure {
        reason: FAILURE_MESSAGE.to_string(),
        placeholder: (mode == Mode::Cluster).then(|| placeholder_cluster(topic, subtopic_target)),
    }
}

fn repaired_value(candidate: &str) -> Result<Value, RepairError> {
    let repaired = repair(candidate)?;
    Ok(serde_json::from_str(&repaired)?)
}

fn coerce(value: &Value, mode: Mode, topic: &str) -> Result<Normalized, ShapeError> {
    match mode {
        Mode::Single => article_from_value(value).map(Normalized::Article),
        Mode::Cluster => cluster_from_value(value, topic).map(Normalized::Cluster),
    }
}

fn success(value: Normalized, strategy: Strategy) -> NormalizationResult {
    info!("Normalized model response via {strategy:?} strategy");
    NormalizationResult::Success { value, strategy }
}
