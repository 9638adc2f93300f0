//! Parser for the reranking model's reply.
//!
//! ```text
//! reply     := ws [ "<think>" reasoning "</think>" ] content
//! content   := token ( "," token )*
//! token     := ws uuid ws | <anything else, ignored>
//! ```
//!
//! Markers match case-insensitively and may each appear at most once.

use uuid::Uuid;

use crate::error::{BookError, BookResult};
use crate::llm::prompts::{THINK_CLOSE, THINK_OPEN};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedReply {
    /// Trimmed text between the markers, if the reply had them
    pub reasoning: Option<String>,
    /// Distinct ids in reply order
    pub ids: Vec<Uuid>,
}

/// Parses a reply. With `explanation_required`, a missing or empty reasoning
/// segment or an empty content segment is a `Parse` error.
pub fn parse_reply(reply: &str, explanation_required: bool) -> BookResult<ParsedReply> {
    let (reasoning, content) = split_segments(reply)?;

    if explanation_required {
        if reasoning.is_none_or(str::is_empty) {
            return Err(BookError::Parse(
                "explanation requested but the reply has no reasoning segment".to_string(),
            ));
        }
        if content.trim().is_empty() {
            return Err(BookError::Parse(
                "explanation requested but the reply has no content after the reasoning".to_string(),
            ));
        }
    }

    Ok(ParsedReply {
        reasoning: reasoning.filter(|r| !r.is_empty()).map(str::to_string),
        ids: parse_ids(content),
    })
}

/// Splits off the reasoning segment, returning `(reasoning, content)`
fn split_segments(reply: &str) -> BookResult<(Option<&str>, &str)> {
    // ASCII lowercasing keeps byte offsets aligned with `reply`
    let lower = reply.to_ascii_lowercase();
    let open = lower.find(THINK_OPEN);
    let close = lower.find(THINK_CLOSE);

    match (open, close) {
        (None, None) => Ok((None, reply)),
        (Some(_), None) => Err(BookError::Parse(
            "reasoning segment is never closed".to_string(),
        )),
        (None, Some(_)) => Err(BookError::Parse(
            "reasoning end marker without a start marker".to_string(),
        )),
        (Some(open), Some(close)) => {
            if close < open {
                return Err(BookError::Parse(
                    "reasoning end marker before its start marker".to_string(),
                ));
            }
            if !reply[..open].trim().is_empty() {
                return Err(BookError::Parse(
                    "unexpected text before the reasoning segment".to_string(),
                ));
            }

            let reasoning = &reply[open + THINK_OPEN.len()..close];
            let content = &reply[close + THINK_CLOSE.len()..];

            let rest = &lower[open + THINK_OPEN.len()..];
            if rest.contains(THINK_OPEN) || lower[close + THINK_CLOSE.len()..].contains(THINK_CLOSE) {
                return Err(BookError::Parse(
                    "more than one reasoning segment".to_string(),
                ));
            }

            Ok((Some(reasoning.trim()), content))
        }
    }
}

/// Comma-separated ids; tokens that are not UUIDs are skipped, repeats collapse
fn parse_ids(content: &str) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for token in content.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match Uuid::parse_str(token) {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => tracing::debug!(token, "Ignoring non-UUID token in LLM reply"),
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0196f2d0-6b43-7c61-9d0a-3c1f5e2a8b10";
    const B: &str = "0196f2d0-6b43-7c61-9d0a-3c1f5e2a8b11";

    fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_plain_id_list() {
        let parsed = parse_reply(&format!("{},{}", A, B), false).unwrap();
        assert_eq!(parsed.ids, vec![id(A), id(B)]);
        assert_eq!(parsed.reasoning, None);
    }

    #[test]
    fn test_reasoning_and_ids() {
        let reply = format!("<think>\n Both match.\n</think>\n{}, {}\n", A, B);
        let parsed = parse_reply(&reply, true).unwrap();
        assert_eq!(parsed.reasoning.as_deref(), Some("Both match."));
        assert_eq!(parsed.ids, vec![id(A), id(B)]);
    }

    #[test]
    fn test_markers_are_case_insensitive() {
        let parsed = parse_reply(&format!("<THINK>ok</Think>{}", A), true).unwrap();
        assert_eq!(parsed.reasoning.as_deref(), Some("ok"));
        assert_eq!(parsed.ids, vec![id(A)]);
    }

    #[test]
    fn test_empty_reply_means_no_match() {
        assert_eq!(parse_reply("", false).unwrap(), ParsedReply::default());
        assert_eq!(parse_reply("  \n ", false).unwrap(), ParsedReply::default());
    }

    #[test]
    fn test_empty_content_after_reasoning_is_fine_without_explanation() {
        let parsed = parse_reply("<think>nothing fits</think>", false).unwrap();
        assert!(parsed.ids.is_empty());
        assert_eq!(parsed.reasoning.as_deref(), Some("nothing fits"));
    }

    #[test]
    fn test_explanation_required_needs_both_segments() {
        for reply in [
            A.to_string(),
            "".to_string(),
            format!("<think>   </think>{}", A),
            "<think>nothing fits</think>".to_string(),
            "<think>nothing fits</think>  \n".to_string(),
        ] {
            assert!(
                matches!(parse_reply(&reply, true), Err(BookError::Parse(_))),
                "accepted {:?}",
                reply
            );
        }
    }

    #[test]
    fn test_structurally_invalid_markers() {
        for reply in [
            format!("<think>never closed {}", A),
            format!("{}</think>", A),
            format!("</think><think>{}", A),
            format!("Sure! <think>x</think>{}", A),
            format!("<think>a</think><think>b</think>{}", A),
            format!("<think>a</think>{}</think>", A),
        ] {
            assert!(
                matches!(parse_reply(&reply, false), Err(BookError::Parse(_))),
                "accepted {:?}",
                reply
            );
        }
    }

    #[test]
    fn test_garbage_tokens_are_skipped() {
        let reply = format!("not-an-id, {} ,,{{{}}}x, 42,\t{}", A, B, B);
        let parsed = parse_reply(&reply, false).unwrap();
        assert_eq!(parsed.ids, vec![id(A), id(B)]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let parsed = parse_reply(&format!("{},{},{}", A, A, A), false).unwrap();
        assert_eq!(parsed.ids, vec![id(A)]);
    }

    #[test]
    fn test_prose_instead_of_ids_yields_nothing() {
        let parsed = parse_reply("I would recommend Dune and Foundation.", false).unwrap();
        assert!(parsed.ids.is_empty());
    }

    #[test]
    fn test_non_ascii_reasoning_keeps_offsets() {
        let reply = format!("<think>Très bien, ça marche</think>{}", A);
        let parsed = parse_reply(&reply, true).unwrap();
        assert_eq!(parsed.reasoning.as_deref(), Some("Très bien, ça marche"));
        assert_eq!(parsed.ids, vec![id(A)]);
    }
}
