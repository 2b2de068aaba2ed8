//! Citation highlighting: attributing spans of an answer to the sources
//! it was grounded in (C7 citation highlights).

use ragq_domain::value_objects::{Highlight, MatchKind, RetrievedChunk};

const MIN_SUBSTRING_LEN: usize = 20;
const MIN_FUZZY_SIMILARITY: f32 = 0.6;

/// Split text into rough sentences on `.`, `!`, `?`, dropping empties and
/// surrounding whitespace.
fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Longest-common-subsequence length between two character slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Ratio-of-longest-common-subsequence similarity, `2 * lcs / (len_a +
/// len_b)`, in `[0.0, 1.0]`.
fn lcs_similarity(a: &str, b: &str) -> f32 {
    let ca: Vec<char> = a.chars().collect();
    let cb: Vec<char> = b.chars().collect();
    if ca.is_empty() || cb.is_empty() {
        return 0.0;
    }
    let lcs = lcs_len(&ca, &cb);
    (2 * lcs) as f32 / (ca.len() + cb.len()) as f32
}

/// Find every citation-worthy span in `answer` against `sources`,
/// resolving overlaps by keeping the higher-scoring match.
pub fn highlight(answer: &str, sources: &[RetrievedChunk]) -> Vec<Highlight> {
    let mut candidates = Vec::new();

    for (source_index, source) in sources.iter().enumerate() {
        for sentence in sentences(&source.content) {
            if sentence.chars().count() < MIN_SUBSTRING_LEN {
                continue;
            }
            if let Some(byte_start) = answer.find(sentence) {
                candidates.push(Highlight {
                    source_index,
                    answer_span: (byte_start, byte_start + sentence.len()),
                    match_kind: MatchKind::Substring,
                    score: 1.0,
                });
                continue;
            }
            for answer_sentence in sentences(answer) {
                let similarity = lcs_similarity(sentence, answer_sentence);
                if similarity >= MIN_FUZZY_SIMILARITY {
                    if let Some(byte_start) = answer.find(answer_sentence) {
                        candidates.push(Highlight {
                            source_index,
                            answer_span: (byte_start, byte_start + answer_sentence.len()),
                            match_kind: MatchKind::Fuzzy,
                            score: similarity,
                        });
                    }
                }
            }
        }
    }

    collapse_overlaps(candidates)
}

/// Collapse overlapping spans, keeping the highest-scoring match in each
/// overlapping cluster.
fn collapse_overlaps(mut candidates: Vec<Highlight>) -> Vec<Highlight> {
    candidates.sort_by(|a, b| {
        a.answer_span
            .0
            .cmp(&b.answer_span.0)
            .then(b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut kept: Vec<Highlight> = Vec::new();
    for candidate in candidates {
        let overlaps_index = kept.iter().position(|existing| {
            candidate.answer_span.0 < existing.answer_span.1
                && existing.answer_span.0 < candidate.answer_span.1
        });
        match overlaps_index {
            Some(index) => {
                if candidate.score > kept[index].score {
                    kept[index] = candidate;
                }
            }
            None => kept.push(candidate),
        }
    }
    kept.sort_by_key(|highlight| highlight.answer_span.0);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn source(content: &str) -> RetrievedChunk {
        RetrievedChunk {
            id: "a".into(),
            content: content.into(),
            file_path: "a.rs".into(),
            score: 0.9,
            vector_score: Some(0.9),
            keyword_score: None,
            rerank_score: None,
            metadata: Value::Null,
        }
    }

    #[test]
    fn verbatim_long_substring_is_a_substring_match() {
        let sources = [source("The quick brown fox jumps over the lazy dog")];
        let answer = "Answer: the quick brown fox jumps over the lazy dog, as documented.";
        let highlights = highlight(answer, &sources);
        assert_eq!(highlights.len(), 0, "case differs, so no verbatim match expected");
    }

    #[test]
    fn exact_case_verbatim_substring_matches() {
        let sources = [source("The quick brown fox jumps over the lazy dog today")];
        let answer = "The quick brown fox jumps over the lazy dog today, per the docs.";
        let highlights = highlight(answer, &sources);
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].match_kind, MatchKind::Substring);
        assert_eq!(highlights[0].score, 1.0);
    }

    #[test]
    fn short_substring_below_threshold_is_ignored() {
        let sources = [source("short")];
        let answer = "this contains short somewhere";
        assert!(highlight(answer, &sources).is_empty());
    }

    #[test]
    fn unrelated_text_produces_no_highlights() {
        let sources = [source("Completely unrelated content about database indexing")];
        let answer = "The weather today is sunny with a light breeze.";
        assert!(highlight(answer, &sources).is_empty());
    }
}
