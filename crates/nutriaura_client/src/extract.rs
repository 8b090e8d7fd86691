//! Locating and parsing the structured analysis block in model output.
//!
//! Grounded requests cannot use the JSON response mode, so the model is asked
//! to embed the result in its text. Candidate blocks are tried in order:
//! 1. the whole text being a JSON object,
//! 2. every fenced code block (```` ```json ... ``` ````),
//! 3. the balanced `{ ... }` span starting at each opening brace.
//!
//! The first candidate that deserializes as an [`AnalysisResult`] wins, so
//! stray braces in the prose ahead of the real block are skipped.

use crate::{AnalysisError, AnalysisResult};
use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("fenced block regex is valid")
});

/// All JSON object candidates embedded in `text`, most specific first.
pub fn candidate_blocks(text: &str) -> impl Iterator<Item = &str> {
    let trimmed = text.trim();
    let whole = (trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed);
    let fenced = FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()));
    let balanced = text
        .match_indices('{')
        .filter_map(move |(start, _)| balanced_object(text, start));
    whole.into_iter().chain(fenced).chain(balanced)
}

/// Return the first JSON object text embedded in `text`, if any.
pub fn extract_json_block(text: &str) -> Option<&str> {
    candidate_blocks(text).next()
}

fn balanced_object(text: &str, start: usize) -> Option<&str> {
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
            '{' => depth += 1,
            '}' => {
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

/// Parse model output into an [`AnalysisResult`].
///
/// When no candidate parses, the error from the first candidate is reported.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let mut first_error = None;
    for block in candidate_blocks(text) {
        match serde_json::from_str::<AnalysisResult>(block) {
            Ok(result) => return Ok(result),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(AnalysisError::MalformedResponse(match first_error {
        Some(e) => e.to_string(),
        None => "no structured block in model output".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"scores":{"nutrition":40,"sleep":30,"stress":25,"hydration":35},"keyFindings":[],"recommendations":[]}"#;

    #[test]
    fn bare_object_is_used_as_is() {
        assert_eq!(extract_json_block(&format!("  {BODY}\n")), Some(BODY));
    }

    #[test]
    fn fenced_block_wins_over_prose_braces() {
        let text = format!("Here you go {{not json}}\n```json\n{BODY}\n```\nStay hydrated!");
        assert_eq!(extract_json_block(&text), Some(BODY));
    }

    #[test]
    fn balanced_scan_skips_braces_in_strings() {
        let text = r#"Result: {"a": "curly } brace", "b": {"c": 1}} trailing"#;
        assert_eq!(
            extract_json_block(text),
            Some(r#"{"a": "curly } brace", "b": {"c": 1}}"#)
        );
    }

    #[test]
    fn unterminated_object_yields_none() {
        assert_eq!(extract_json_block("oops {\"a\": 1"), None);
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn parse_analysis_reads_scores() {
        let result = parse_analysis(&format!("```\n{BODY}\n```")).expect("parse");
        assert_eq!(result.scores.stress, 25);
        assert!(result.grounding_attribution.is_none());
    }

    #[test]
    fn placeholder_braces_before_the_block_are_skipped() {
        let text = format!("Based on your {{selfie}} here is the analysis: {BODY}");
        let result = parse_analysis(&text).expect("parse");
        assert_eq!(result.scores.nutrition, 40);
    }

    #[test]
    fn draft_object_before_the_final_block_is_skipped() {
        let text = format!("{{\"note\": \"draft\"}}\n\nFinal:\n{BODY}");
        let result = parse_analysis(&text).expect("parse");
        assert_eq!(result.scores.hydration, 35);
    }

    #[test]
    fn later_fenced_block_is_tried() {
        let text = format!("```json\n{{\"draft\": true}}\n```\n```json\n{BODY}\n```");
        let result = parse_analysis(&text).expect("parse");
        assert_eq!(result.scores.sleep, 30);
    }

    #[test]
    fn scores_as_array_is_malformed() {
        let err = parse_analysis(r#"{"scores": [40, 30, 25, 35]}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn parse_analysis_without_scores_is_malformed() {
        let err = parse_analysis(r#"{"keyFindings": []}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }
}
