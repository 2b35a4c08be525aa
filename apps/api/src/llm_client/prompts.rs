// Shared prompt constants and prompt-building utilities.
// The generation module defines its own templates in generation/prompts.rs;
// this file holds the cross-cutting fragments.

/// System prompt fragment that asks for JSON-only output.
/// Models still wrap or mangle it often enough that the normalizer exists.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Rules for the HTML placed inside `content` fields.
pub const HTML_CONTENT_INSTRUCTION: &str = "\
    The `content` field is an HTML fragment for a blog post body. \
    Use <h2>/<h3> for headings, <p> for paragraphs, <ul>/<ol> for lists and <table> for tables. \
    Do NOT include <html>, <head>, <body> or an <h1>; the title is rendered separately. \
    Escape double quotes inside JSON strings.";

/// SEO rules shared by single articles and clusters.
pub const SEO_INSTRUCTION: &str = "\
    Write for search: put the primary keyword in the title and the first paragraph, \
    use secondary keywords naturally in headings, never keyword-stuff. \
    `metaDescription` must be 150-160 characters and read as a call to action. \
    `tags` are 3-6 short lowercase phrases.";
