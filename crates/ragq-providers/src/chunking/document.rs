//! Heading-aware document chunker.
//!
//! Walks the document line by line, tracking a stack of open Markdown
//! headings (`#`, `##`, ...). Each time a heading closes a section, that
//! section's accumulated text becomes one or more chunks, prefixed with a
//! breadcrumb built from the heading stack. Ported from the heading-stack
//! and breadcrumb-prefix logic of the original Python document chunker,
//! which tracked `DocumentContext.heading_stack` and truncated
//! `build_context_prefix` at a fixed length.

use ragq_domain::constants::{CHUNK_CONTEXT_PREFIX_MAX_LEN, CHUNK_OVERLAP_SIZE, CHUNK_TARGET_SIZE};
use ragq_domain::entities::{Chunk, ChunkKind};
use ragq_domain::error::Result;
use ragq_domain::ports::providers::DocumentChunker;

use super::splitter::recursive_split;

struct HeadingLevel {
    level: usize,
    text: String,
}

struct Section {
    heading_hierarchy: Vec<String>,
    heading: Option<String>,
    body: String,
}

/// `DocumentChunker` that segments Markdown (or near-Markdown plaintext) by
/// heading boundaries, falling back to a flat recursive split when a
/// document has no headings or a section exceeds the target chunk size.
#[derive(Default)]
pub struct HeadingAwareDocumentChunker;

impl HeadingAwareDocumentChunker {
    /// Build a new chunker.
    pub fn new() -> Self {
        Self
    }
}

fn heading_level(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = trimmed[hashes..].trim();
    if rest.is_empty() {
        return None;
    }
    Some((hashes, rest))
}

fn split_into_sections(text: &str) -> Vec<Section> {
    let mut stack: Vec<HeadingLevel> = Vec::new();
    let mut sections = Vec::new();
    let mut current_body = String::new();

    let flush = |stack: &[HeadingLevel], body: &mut String, sections: &mut Vec<Section>| {
        if !body.trim().is_empty() {
            sections.push(Section {
                heading_hierarchy: stack.iter().map(|h| h.text.clone()).collect(),
                heading: stack.last().map(|h| h.text.clone()),
                body: std::mem::take(body),
            });
        } else {
            body.clear();
        }
    };

    for line in text.lines() {
        if let Some((level, heading_text)) = heading_level(line) {
            flush(&stack, &mut current_body, &mut sections);
            while stack.last().is_some_and(|h| h.level >= level) {
                stack.pop();
            }
            stack.push(HeadingLevel {
                level,
                text: format!("{} {}", "#".repeat(level), heading_text),
            });
        } else {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }
    flush(&stack, &mut current_body, &mut sections);

    sections
}

/// Strip a heading's leading `#`s and surrounding whitespace, e.g.
/// `"## Setup"` -> `"Setup"`.
fn heading_title(raw: &str) -> &str {
    raw.trim_start_matches('#').trim()
}

fn build_context_prefix(file_path: &str, hierarchy: &[String]) -> String {
    let mut parts = vec![file_path.to_string()];
    parts.extend(hierarchy.iter().map(|h| heading_title(h).to_string()));
    let prefix = parts.join(" > ");

    if prefix.chars().count() > CHUNK_CONTEXT_PREFIX_MAX_LEN {
        let truncated: String = prefix.chars().take(CHUNK_CONTEXT_PREFIX_MAX_LEN.saturating_sub(3)).collect();
        format!("{truncated}...")
    } else {
        prefix
    }
}

impl DocumentChunker for HeadingAwareDocumentChunker {
    fn chunk(&self, text: &str, file_path: &str, doc_type: &str) -> Result<Vec<Chunk>> {
        let sections = split_into_sections(text);
        let mut chunks = Vec::new();
        let mut ordinal = 0u32;

        for section in sections {
            let pieces = recursive_split(section.body.trim(), CHUNK_TARGET_SIZE, CHUNK_OVERLAP_SIZE);
            let prefix = build_context_prefix(file_path, &section.heading_hierarchy);

            for piece in pieces {
                if piece.trim().is_empty() {
                    continue;
                }

                let enhanced_content = if prefix.is_empty() {
                    piece.clone()
                } else {
                    format!("[{prefix}]\n\n{piece}")
                };

                chunks.push(Chunk {
                    id: Chunk::derive_id(file_path, ordinal),
                    content: piece,
                    enhanced_content,
                    file_path: file_path.to_string(),
                    ordinal,
                    kind: ChunkKind::Document,
                    language: Some(doc_type.to_string()),
                    heading_hierarchy: section.heading_hierarchy.clone(),
                    heading: section.heading.clone(),
                    symbol: None,
                    file_docstring: None,
                    class_context: None,
                    owner_id: None,
                    is_public: false,
                });
                ordinal += 1;
            }
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_carry_the_enclosing_heading() {
        let text = "# Intro\n\nSome introductory text that is long enough to survive the minimum length filter.\n\n## Setup\n\nSetup instructions that are also long enough to survive filtering out short chunks.";
        let chunker = HeadingAwareDocumentChunker::new();
        let chunks = chunker.chunk(text, "doc.md", "markdown").unwrap();

        assert!(chunks.iter().any(|c| c.heading.as_deref() == Some("# Intro")));
        assert!(chunks.iter().any(|c| c.heading.as_deref() == Some("## Setup")));
    }

    #[test]
    fn heading_hierarchy_nests_under_parent() {
        let text = "# Top\n\n## Child\n\nChild section body text that is long enough to not be filtered by the minimum length rule.";
        let chunker = HeadingAwareDocumentChunker::new();
        let chunks = chunker.chunk(text, "doc.md", "markdown").unwrap();

        let child = chunks.iter().find(|c| c.heading.as_deref() == Some("## Child")).unwrap();
        assert_eq!(child.heading_hierarchy, vec!["# Top".to_string(), "## Child".to_string()]);
    }

    #[test]
    fn document_with_no_headings_still_chunks() {
        let text = "Plain text with no headings at all, long enough to survive the minimum length filter applied to chunks.";
        let chunker = HeadingAwareDocumentChunker::new();
        let chunks = chunker.chunk(text, "doc.txt", "plaintext").unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].heading.is_none());
    }

    #[test]
    fn sibling_heading_closes_previous_sections_stack_entry() {
        let text = "# A\n\n## A1\n\nbody one long enough to not be filtered out by minimum length checks here.\n\n## A2\n\nbody two long enough to not be filtered out by minimum length checks here.";
        let chunker = HeadingAwareDocumentChunker::new();
        let chunks = chunker.chunk(text, "doc.md", "markdown").unwrap();

        let a2 = chunks.iter().find(|c| c.heading.as_deref() == Some("## A2")).unwrap();
        assert_eq!(a2.heading_hierarchy, vec!["# A".to_string(), "## A2".to_string()]);
    }

    #[test]
    fn short_sections_still_produce_a_chunk_each() {
        let text = "# Intro\n\nHello\n\n## Setup\n\nRun `make`.";
        let chunker = HeadingAwareDocumentChunker::new();
        let chunks = chunker.chunk(text, "docs/a.md", "markdown").unwrap();

        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn breadcrumb_leads_with_file_name_and_bare_heading_titles() {
        let text = "# Intro\n\nHello\n\n## Setup\n\nRun `make`.";
        let chunker = HeadingAwareDocumentChunker::new();
        let chunks = chunker.chunk(text, "docs/a.md", "markdown").unwrap();

        let intro = chunks.iter().find(|c| c.heading.as_deref() == Some("# Intro")).unwrap();
        assert!(intro.enhanced_content.starts_with("[docs/a.md > Intro]"));

        let setup = chunks.iter().find(|c| c.heading.as_deref() == Some("## Setup")).unwrap();
        assert!(setup.enhanced_content.starts_with("[docs/a.md > Intro > Setup]"));
    }
}
