//! Manual extraction: last-resort recovery for responses with no usable JSON.
//!
//! Splits the raw text on heading-like marker lines ("Article 2:",
//! "**Subtopic 3:**", "## Pillar:") and builds a low-fidelity article from
//! each segment.

use uuid::Uuid;

use crate::models::article::{Article, Cluster};
use crate::normalizer::shape::{synthesized_pillar, topic_or_untitled};

/// Segment bodies are cut to this many characters before wrapping.
pub const MAX_SEGMENT_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Pillar,
    Article,
}

/// Marker words, longest first so "pillar article" wins over "pillar".
const MARKERS: &[(&str, MarkerKind)] = &[
    ("pillar article", MarkerKind::Pillar),
    ("pillar", MarkerKind::Pillar),
    ("sub-article", MarkerKind::Article),
    ("sub-topic", MarkerKind::Article),
    ("subtopic", MarkerKind::Article),
    ("article", MarkerKind::Article),
];

#[derive(Debug)]
struct Segment<'a> {
    kind: MarkerKind,
    heading: &'a str,
    body: Vec<&'a str>,
}

/// Text before the first marker, plus every marked segment in order.
fn split_segments(text: &str) -> (Vec<&str>, Vec<Segment<'_>>) {
    let mut preamble = Vec::new();
    let mut segments: Vec<Segment<'_>> = Vec::new();

    for line in text.lines() {
        if let Some((kind, heading)) = parse_marker(line) {
            segments.push(Segment {
                kind,
                heading,
                body: Vec::new(),
            });
        } else if let Some(current) = segments.last_mut() {
            current.body.push(line);
        } else {
            preamble.push(line);
        }
    }

    (preamble, segments)
}

/// Recognizes a marker line and returns its kind and the text after the colon.
fn parse_marker(line: &str) -> Option<(MarkerKind, &str)> {
    let stripped = line.trim_start_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace());

    let (kind, rest) = MARKERS.iter().find_map(|(word, kind)| {
        let head = stripped.get(..word.len())?;
        head.eq_ignore_ascii_case(word)
            .then(|| (*kind, &stripped[word.len()..]))
    })?;

    let rest = rest.trim_start();
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if kind == MarkerKind::Article && digits == 0 {
        return None;
    }

    let rest = rest[digits..].trim_start_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
    let heading = rest.strip_prefix(':')?;
    Some((kind, clean_heading(heading)))
}

fn clean_heading(text: &str) -> &str {
    text.trim_matches(|c: char| c == '*' || c == '_' || c == '#' || c.is_whitespace())
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let trimmed = clean_heading(line);
    let head = trimmed.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    trimmed[label.len()..]
        .trim_start_matches(|c: char| c == '*' || c == '_')
        .strip_prefix(':')
        .map(|rest| clean_heading(rest).trim_matches('"'))
}

/// `None` when the segment has no body text, matching the JSON path's
/// refusal of articles without content.
fn segment_to_article(segment: &Segment<'_>, index: usize, topic: &str) -> Option<Article> {
    let mut body: Vec<&str> = segment.body.clone();

    let mut title = strip_label(segment.heading, "title")
        .unwrap_or(segment.heading)
        .trim_matches('"')
        .to_string();

    if title.is_empty() {
        if let Some(pos) = body.iter().position(|l| !l.trim().is_empty()) {
            let first = body[pos];
            let from_label = strip_label(first, "title");
            let from_heading = first
                .trim_start()
                .starts_with('#')
                .then(|| clean_heading(first));
            if let Some(found) = from_label.or(from_heading) {
                title = found.to_string();
                body.remove(pos);
            }
        }
    }

    if title.is_empty() {
        title = format!("{}: Part {}", topic_or_untitled(topic), index + 1);
    }

    let mut meta_description = None;
    let body: Vec<&str> = body
        .into_iter()
        .filter_map(|line| {
            if let Some(meta) = strip_label(line, "meta description") {
                meta_description = Some(meta.to_string()).filter(|m| !m.is_empty());
                return None;
            }
            Some(strip_label(line, "content").unwrap_or(line))
        })
        .collect();

    let content = paragraphs(&body.join("\n"));
    if content.is_empty() {
        return None;
    }

    Some(Article {
        id: Some(Uuid::new_v4()),
        title,
        content,
        meta_description,
        tags: topic_tags(topic),
    })
}

fn topic_tags(topic: &str) -> Option<Vec<String>> {
    let topic = topic.trim();
    (!topic.is_empty()).then(|| vec![topic.to_string()])
}

/// Truncates to the segment cap and wraps blank-line separated blocks in
/// `<p>`. Blocks that already start with markup are left alone.
fn paragraphs(text: &str) -> String {
    let truncated: String = text.trim().chars().take(MAX_SEGMENT_CHARS).collect();

    truncated
        .split("\n\n")
        .map(|block| {
            block
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|block| !block.is_empty())
        .map(|block| {
            if block.starts_with('<') {
                block
            } else {
                format!("<p>{block}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single mode: the first marked segment with a body, whatever its kind.
pub fn extract_article(text: &str, topic: &str) -> Option<Article> {
    let (_, segments) = split_segments(text);
    segments
        .iter()
        .find_map(|segment| segment_to_article(segment, 0, topic))
}

/// Cluster mode: every article marker becomes a subtopic. The first pillar
/// marker becomes the pillar; without one, the pillar is synthesized from the
/// topic and any preamble text. Segments without a body are skipped; `None`
/// when no usable segment remains.
pub fn extract_cluster(text: &str, topic: &str) -> Option<Cluster> {
    let (preamble, segments) = split_segments(text);

    let mut pillar = None;
    let mut subtopics = Vec::new();
    for segment in &segments {
        if segment.kind == MarkerKind::Pillar && pillar.is_none() {
            pillar = segment_to_article(segment, 0, topic);
        } else if let Some(article) = segment_to_article(segment, subtopics.len(), topic) {
            subtopics.push(article);
        }
    }

    if pillar.is_none() && subtopics.is_empty() {
        return None;
    }

    let pillar = pillar.unwrap_or_else(|| Article {
        content: paragraphs(&preamble.join("\n")),
        ..synthesized_pillar(topic)
    });

    Some(Cluster { pillar, subtopics })
}
