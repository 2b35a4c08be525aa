//! Candidate extraction: pulls the JSON-looking part out of a raw completion.

/// Returns the substring of `text` most likely to hold the JSON payload.
///
/// Order: a ```json fence, then an unlabeled fence, then the first balanced
/// `{...}` / `[...]` span, then the whole trimmed text.
pub fn extract_candidate(text: &str) -> &str {
    let text = text.trim();

    let fences = code_fences(text);
    let fenced = fences
        .iter()
        .find(|(label, body)| label.eq_ignore_ascii_case("json") && !body.is_empty())
        .or_else(|| {
            fences
                .iter()
                .find(|(label, body)| label.is_empty() && !body.is_empty())
        });
    if let Some(&(_, body)) = fenced {
        return body;
    }

    bracket_span(text).unwrap_or(text)
}

/// Collects every ``` fence as (label, trimmed body). An unclosed final fence
/// runs to the end of the text.
fn code_fences(text: &str) -> Vec<(&str, &str)> {
    let mut fences = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let label_len = after
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after.len());
        let label = &after[..label_len];
        let body = &after[label_len..];

        match body.find("```") {
            Some(close) => {
                fences.push((label, body[..close].trim()));
                rest = &body[close + 3..];
            }
            None => {
                fences.push((label, body.trim()));
                break;
            }
        }
    }

    fences
}

/// Finds the first `{` or `[` and returns the span up to its matching closer.
/// Quoted sections are skipped so brackets inside strings do not count.
/// If the span never balances (truncated output) it runs to the end of text.
fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string: Option<&'static [char]> = None;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if let Some(closers) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if closers.contains(&c) {
                in_string = None;
            }
            continue;
        }

        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => in_string = string_closers(c),
        }
    }

    Some(&text[start..])
}

const DOUBLE_QUOTE: &[char] = &['"'];
const SINGLE_QUOTE: &[char] = &['\''];
const SMART_DOUBLE: &[char] = &['\u{201D}', '\u{201C}'];
const SMART_SINGLE: &[char] = &['\u{2019}', '\u{2018}'];

/// Characters that may close a string opened by `open`, if `open` is a quote.
pub(crate) fn string_closers(open: char) -> Option<&'static [char]> {
    match open {
        '"' => Some(DOUBLE_QUOTE),
        '\'' => Some(SINGLE_QUOTE),
        '\u{201C}' | '\u{201D}' => Some(SMART_DOUBLE),
        '\u{2018}' => Some(SMART_SINGLE),
        _ => None,
    }
}
