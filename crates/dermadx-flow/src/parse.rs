//! Defensive parsers for text-generation output.
//!
//! The service is an untrusted oracle: it may wrap JSON in Markdown fences,
//! add prose around it, or ignore the requested schema entirely. Parsers here
//! never panic and report exactly what they could not use.

use dermadx_core::{Candidate, DiagnosisError};
use serde_json::Value;

/// Outcome of parsing a candidate list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCandidates {
    pub candidates: Vec<Candidate>,
    /// Array entries that were not `{disease: string, score: 0..=1}` objects.
    pub rejected: usize,
}

/// Strip a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Locate the first balanced `[...]` span, ignoring brackets inside JSON strings.
pub fn first_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a `[{"disease": ..., "score": ...}, ...]` response.
///
/// Fails with `MalformedResponse` when no JSON array can be found. Inside a
/// valid array, unusable entries are skipped and counted in `rejected`.
pub fn parse_candidates(raw: &str) -> Result<ParsedCandidates, DiagnosisError> {
    let body = strip_code_fence(raw);
    let span = first_json_array(body)
        .ok_or_else(|| DiagnosisError::MalformedResponse("no JSON array in response".into()))?;

    let entries: Vec<Value> = serde_json::from_str(span)
        .map_err(|e| DiagnosisError::MalformedResponse(format!("invalid JSON array: {e}")))?;

    let mut parsed = ParsedCandidates::default();
    for entry in &entries {
        match candidate_from_value(entry) {
            Some(c) => parsed.candidates.push(c),
            None => parsed.rejected += 1,
        }
    }

    if !entries.is_empty() && parsed.candidates.is_empty() {
        return Err(DiagnosisError::MalformedResponse(
            "array contains no {disease, score} objects".into(),
        ));
    }

    Ok(parsed)
}

fn candidate_from_value(value: &Value) -> Option<Candidate> {
    let obj = value.as_object()?;
    let label = obj.get("disease")?.as_str()?.trim();
    if label.is_empty() {
        return None;
    }
    let score = obj.get("score")?.as_f64()? as f32;
    Candidate::checked(label, score)
}

/// Split a question list on newlines, trimming and dropping blank lines.
pub fn parse_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accept plain-text output verbatim, trimmed. Blank output is malformed.
pub fn plain_text(raw: &str, what: &str) -> Result<String, DiagnosisError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DiagnosisError::MalformedResponse(format!("empty {what}")));
    }
    Ok(text.to_string())
}

/// A disease name is accepted verbatim; it need not be a known label.
pub fn parse_disease(raw: &str) -> Result<String, DiagnosisError> {
    plain_text(raw, "disease name")
}

/// Section headings (case-insensitive) absent from `text`, checked in order.
///
/// A heading that only appears before the previous one counts as missing.
pub fn missing_sections<'a>(text: &str, sections: &[&'a str]) -> Vec<&'a str> {
    let lower = text.to_lowercase();
    let mut cursor = 0usize;
    let mut missing = Vec::new();

    for &section in sections {
        match lower[cursor..].find(&section.to_lowercase()) {
            Some(pos) => cursor += pos + section.len(),
            None => missing.push(section),
        }
    }

    missing
}
