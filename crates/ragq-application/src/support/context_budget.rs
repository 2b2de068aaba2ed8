//! Context assembly with head+tail truncation and a total-length budget
//! (C7 context budgeting).

use ragq_domain::constants::{MAX_CONTEXT_CHARS, MAX_SINGLE_CONTENT_CHARS};
use ragq_domain::value_objects::RetrievedChunk;

/// The result of assembling a context string from retrieved sources.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    /// The final context text, ready to splice into the prompt template.
    pub text: String,
    /// Number of sources actually included before the budget was hit.
    pub included: usize,
    /// Index into the input slice of the first source dropped for
    /// exceeding `MAX_CONTEXT_CHARS`, `None` if every source fit.
    pub cut_off_index: Option<usize>,
}

/// Format one source as `[reference i] file_path, score, content`,
/// truncating `content` head+tail with an ellipsis marker if it exceeds
/// `MAX_SINGLE_CONTENT_CHARS`.
fn format_source(index: usize, chunk: &RetrievedChunk) -> String {
    let content = truncate_single(&chunk.content, MAX_SINGLE_CONTENT_CHARS);
    format!(
        "[reference {}] {}, score {:.3}, {}",
        index + 1,
        chunk.file_path,
        chunk.score,
        content
    )
}

/// Truncate `text` to at most `max_chars`, keeping the head and tail and
/// marking the elision with `" ... "`.
fn truncate_single(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    let marker = " ... ";
    let keep = max_chars.saturating_sub(marker.chars().count());
    let head_len = keep / 2;
    let tail_len = keep - head_len;
    let head: String = chars[..head_len].iter().collect();
    let tail: String = chars[chars.len() - tail_len..].iter().collect();
    format!("{head}{marker}{tail}")
}

/// Assemble the final context string from `sources`, stopping once
/// appending the next source would exceed `MAX_CONTEXT_CHARS`.
pub fn assemble(sources: &[RetrievedChunk]) -> AssembledContext {
    let mut text = String::new();
    let mut included = 0;
    let mut cut_off_index = None;

    for (index, chunk) in sources.iter().enumerate() {
        let formatted = format_source(index, chunk);
        let candidate_len = text.chars().count()
            + formatted.chars().count()
            + if text.is_empty() { 0 } else { 2 };
        if candidate_len > MAX_CONTEXT_CHARS {
            cut_off_index = Some(index);
            break;
        }
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&formatted);
        included += 1;
    }

    AssembledContext {
        text,
        included,
        cut_off_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn chunk(id: &str, content: &str, score: f32) -> RetrievedChunk {
        RetrievedChunk {
            id: id.to_string(),
            content: content.to_string(),
            file_path: format!("{id}.rs"),
            score,
            vector_score: Some(score),
            keyword_score: None,
            rerank_score: None,
            metadata: Value::Null,
        }
    }

    #[test]
    fn single_source_below_budget_is_kept_whole() {
        let assembled = assemble(&[chunk("a", "short content", 0.9)]);
        assert!(assembled.text.contains("short content"));
        assert_eq!(assembled.included, 1);
        assert!(assembled.cut_off_index.is_none());
    }

    #[test]
    fn oversized_single_content_is_truncated_head_and_tail() {
        let long = "x".repeat(MAX_SINGLE_CONTENT_CHARS * 2);
        let assembled = assemble(&[chunk("a", &long, 0.9)]);
        assert!(assembled.text.contains(" ... "));
        assert!(assembled.text.chars().count() < long.chars().count());
    }

    #[test]
    fn total_context_never_exceeds_budget() {
        let long = "y".repeat(MAX_SINGLE_CONTENT_CHARS);
        let sources: Vec<_> = (0..10).map(|i| chunk(&i.to_string(), &long, 0.5)).collect();
        let assembled = assemble(&sources);
        assert!(assembled.text.chars().count() <= MAX_CONTEXT_CHARS);
        assert!(assembled.cut_off_index.is_some());
    }
}
