//! Generation request model: topic, keywords, products and presentation options.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::normalizer::placeholder::{DEFAULT_SUBTOPICS, MAX_SUBTOPICS, MIN_SUBTOPICS};

pub const MIN_H2S: u8 = 1;
pub const MAX_H2S: u8 = 12;

/// A store product the article should feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Display price as the storefront formats it, e.g. "24.99".
    #[serde(default)]
    pub price: Option<String>,
}

/// Target length bucket. Drives the word count given to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ArticleLength {
    pub fn target_words(self) -> u32 {
        match self {
            ArticleLength::Short => 800,
            ArticleLength::Medium => 1500,
            ArticleLength::Long => 2500,
        }
    }
}

/// Presentation preferences. Every field is optional on the wire and falls
/// back to the documented default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub tone_of_voice: String,
    pub writing_perspective: String,
    pub intro_style: String,
    pub buyer_profile: String,
    pub copywriter: Option<String>,
    pub style: String,
    pub gender: Option<String>,
    pub faq_style: String,
    pub article_length: ArticleLength,
    #[serde(rename = "numH2s")]
    pub num_h2s: u8,
    pub enable_tables: bool,
    pub enable_lists: bool,
    pub enable_citations: bool,
    /// Cluster requests only.
    pub subtopic_count: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            tone_of_voice: "friendly".to_string(),
            writing_perspective: "second person".to_string(),
            intro_style: "question".to_string(),
            buyer_profile: "general shoppers".to_string(),
            copywriter: None,
            style: "informative".to_string(),
            gender: None,
            faq_style: "short answers".to_string(),
            article_length: ArticleLength::Medium,
            num_h2s: 5,
            enable_tables: false,
            enable_lists: true,
            enable_citations: false,
            subtopic_count: DEFAULT_SUBTOPICS,
        }
    }
}

/// Request body shared by article and cluster generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Rejects bad input before any network call is made.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.topic.trim().is_empty() {
            return Err(AppError::Validation("topic cannot be empty".to_string()));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::Validation(
                "keywords cannot contain blank entries".to_string(),
            ));
        }
        if let Some(product) = self
            .products
            .iter()
            .find(|p| p.id.trim().is_empty() || p.title.trim().is_empty())
        {
            return Err(AppError::Validation(format!(
                "every product needs an id and a title (got id '{}')",
                product.id
            )));
        }
        if !(MIN_H2S..=MAX_H2S).contains(&self.options.num_h2s) {
            return Err(AppError::Validation(format!(
                "numH2s must be between {MIN_H2S} and {MAX_H2S}"
            )));
        }
        Ok(())
    }

    /// Cluster requests additionally bound the subtopic target.
    pub fn validate_cluster(&self) -> Result<(), AppError> {
        self.validate()?;
        if !(MIN_SUBTOPICS..=MAX_SUBTOPICS).contains(&self.options.subtopic_count) {
            return Err(AppError::Validation(format!(
                "subtopicCount must be between {MIN_SUBTOPICS} and {MAX_SUBTOPICS}"
            )));
        }
        Ok(())
    }
}
