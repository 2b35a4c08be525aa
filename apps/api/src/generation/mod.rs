// Content Generation
// Implements: request model + validation, prompt building, article and cluster pipelines.
// All LLM calls go through llm_client; all output parsing goes through normalizer.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod request;
