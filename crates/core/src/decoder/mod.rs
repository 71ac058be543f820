//! Decoding JSON payloads embedded in free-form model output.
//!
//! Generated text frequently wraps the JSON we asked for in commentary or
//! markdown code fences. The decoder picks the most likely payload:
//!
//! 1. the first fenced block tagged `json`, else the first fenced block;
//! 2. otherwise the whole (trimmed) text;
//! 3. if that still does not parse, the outermost `{...}` or `[...]` span.
//!
//! The selected text is parsed and then deserialized into the caller's type,
//! which is what validates the shape.

#[cfg(test)]
mod props;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

const FENCE: &str = "```";

/// Errors produced while decoding a payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Nothing to decode.
    #[error("response was empty")]
    Empty,

    /// The selected text is not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Syntax(String),

    /// Valid JSON, but not the expected shape.
    #[error("response has unexpected shape: {0}")]
    Shape(String),
}

/// A fenced code block found in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FencedBlock<'a> {
    tag: &'a str,
    body: &'a str,
}

/// Returns every fenced block in order of appearance.
///
/// The info tag is a single word right after the opening fence, whether the
/// payload starts on the next line or on the same line as an inline block.
/// An opening fence without a closing one runs to the end of the text.
fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let (inner, next) = match after_open.find(FENCE) {
            Some(close) => (&after_open[..close], Some(&after_open[close + FENCE.len()..])),
            None => (after_open, None),
        };

        let (tag, body) = split_info_tag(inner);
        blocks.push(FencedBlock {
            tag,
            body: body.trim(),
        });

        match next {
            Some(next) => rest = next,
            None => break,
        }
    }

    blocks
}

/// Splits a leading language word off a fenced block's contents.
fn split_info_tag(inner: &str) -> (&str, &str) {
    let start = inner.trim_start_matches([' ', '\t']);
    let end = start.find(char::is_whitespace).unwrap_or(start.len());
    let word = &start[..end];

    let is_tag = word.starts_with(|c: char| c.is_ascii_alphabetic())
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'));
    if is_tag {
        (word, &start[end..])
    } else {
        ("", inner)
    }
}

/// Selects the text most likely to hold the JSON payload.
#[must_use]
pub fn extract_json_text(raw: &str) -> &str {
    let trimmed = raw.trim();
    let blocks = fenced_blocks(trimmed);

    blocks
        .iter()
        .find(|b| b.tag.eq_ignore_ascii_case("json"))
        .or_else(|| blocks.first())
        .map_or(trimmed, |b| b.body)
}

/// Returns the outermost `{...}` or `[...]` span, whichever opens first.
fn outermost_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Decodes a JSON payload of type `T` from free-form text.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for blank input, `DecodeError::Syntax` when no
/// candidate parses, and `DecodeError::Shape` when the JSON does not match `T`.
pub fn decode_json_payload<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    let candidate = extract_json_text(raw);
    if candidate.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(first) => outermost_span(candidate)
            .filter(|span| *span != candidate)
            .and_then(|span| serde_json::from_str::<Value>(span).ok())
            .ok_or_else(|| DecodeError::Syntax(first.to_string()))?,
    };

    serde_json::from_value(value).map_err(|e| DecodeError::Shape(e.to_string()))
}
