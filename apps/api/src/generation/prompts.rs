// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for single-article generation.
pub const ARTICLE_SYSTEM: &str = "You are an expert e-commerce content marketer and SEO copywriter \
    writing blog posts for an online store. You write accurate, helpful, engaging articles \
    that naturally recommend the store's products where relevant.";

/// System prompt for content-cluster generation.
pub const CLUSTER_SYSTEM: &str = "You are an expert e-commerce content strategist. \
    You plan and write topic clusters: one comprehensive pillar article plus focused \
    subtopic articles that each link back to the pillar.";

/// Single article prompt template.
/// Replace: {json_instruction}, {html_instruction}, {seo_instruction}, {topic},
///          {keywords}, {products}, {style_guide}, {structure_guide}
pub const ARTICLE_PROMPT_TEMPLATE: &str = r#"Write a blog article about: {topic}

TARGET KEYWORDS:
{keywords}

PRODUCTS TO FEATURE (mention by name where genuinely relevant, never invent products):
{products}

STYLE:
{style_guide}

STRUCTURE:
{structure_guide}

{html_instruction}

{seo_instruction}

Return a JSON object with this EXACT schema:
{
  "title": "SEO-optimized article title",
  "content": "<h2>...</h2><p>...</p>",
  "metaDescription": "150-160 character meta description",
  "tags": ["tag one", "tag two", "tag three"]
}

{json_instruction}"#;

/// Content cluster prompt template.
/// Replace: {json_instruction}, {html_instruction}, {seo_instruction}, {topic},
///          {keywords}, {products}, {style_guide}, {structure_guide}, {subtopic_count}
pub const CLUSTER_PROMPT_TEMPLATE: &str = r#"Create a content cluster about: {topic}

The cluster has ONE pillar article that covers the topic broadly, and EXACTLY {subtopic_count}
subtopic articles that each go deep on one narrower aspect. Subtopics must not overlap.
Each subtopic should reference the pillar topic in its introduction.

TARGET KEYWORDS (spread across the cluster, primary keyword on the pillar):
{keywords}

PRODUCTS TO FEATURE (mention by name where genuinely relevant, never invent products):
{products}

STYLE (applies to every article):
{style_guide}

STRUCTURE (pillar article; subtopics may be about half as long):
{structure_guide}

{html_instruction}

{seo_instruction}

Return a JSON object with this EXACT schema:
{
  "pillar": {
    "title": "Pillar article title",
    "content": "<h2>...</h2><p>...</p>",
    "metaDescription": "150-160 character meta description",
    "tags": ["tag"]
  },
  "subtopics": [
    {
      "title": "Subtopic article title",
      "content": "<h2>...</h2><p>...</p>",
      "metaDescription": "150-160 character meta description",
      "tags": ["tag"]
    }
  ]
}

{json_instruction}"#;
