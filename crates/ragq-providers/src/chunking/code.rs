//! Regex-boundary code chunker.
//!
//! Finds function/class/method boundaries with a per-language regular
//! expression, the same strategy the original Python indexer used before
//! falling back to the recursive splitter for anything it couldn't find a
//! boundary for. File-level docstrings are extracted from the first lines
//! of the file: triple-quoted strings for Python, leading comment blocks
//! for C-style languages. Each boundary also gets the name of its nearest
//! preceding `class` definition, if any, the way the original scanned
//! everything before a boundary's position for the last `class` match.

use regex::Regex;
use std::sync::OnceLock;

use ragq_domain::constants::{
    CHUNK_OVERLAP_SIZE, CHUNK_TARGET_SIZE, INDEXING_CHUNK_MIN_LENGTH, INDEXING_CHUNK_MIN_LINES,
};
use ragq_domain::entities::{Chunk, ChunkKind};
use ragq_domain::error::Result;
use ragq_domain::ports::providers::CodeChunker;

use super::splitter::recursive_split;

struct Boundary {
    start_line: usize,
    symbol: Option<String>,
}

fn class_pattern(language: &str) -> Option<&'static Regex> {
    static CLASS: OnceLock<Regex> = OnceLock::new();

    match language {
        "python" | "javascript" | "typescript" | "java" | "cpp" | "php" => {
            Some(CLASS.get_or_init(|| Regex::new(r"(?m)^\s*class\s+(\w+)").unwrap()))
        }
        _ => None,
    }
}

/// Find the nearest `class` definition preceding `before_line`, the way the
/// original chunker's `_detect_class_context` scans everything before a
/// boundary's start position for the last `class` match.
fn enclosing_class(lines: &[&str], before_line: usize, language: &str) -> Option<String> {
    let pattern = class_pattern(language)?;
    let preceding = lines[..before_line.min(lines.len())].join("\n");
    pattern.captures_iter(&preceding).last().map(|c| c[1].to_string())
}

fn boundary_pattern(language: &str) -> Option<&'static Regex> {
    static PY: OnceLock<Regex> = OnceLock::new();
    static RUST: OnceLock<Regex> = OnceLock::new();
    static C_LIKE: OnceLock<Regex> = OnceLock::new();
    static GO: OnceLock<Regex> = OnceLock::new();

    match language {
        "python" => Some(PY.get_or_init(|| Regex::new(r"(?m)^(?:\s*)(?:def|class)\s+(\w+)").unwrap())),
        "rust" => Some(RUST.get_or_init(|| {
            Regex::new(r"(?m)^(?:\s*)(?:pub\s+)?(?:async\s+)?fn\s+(\w+)|^(?:\s*)(?:pub\s+)?(?:struct|enum|trait|impl)\s+(\w+)")
                .unwrap()
        })),
        "go" => Some(GO.get_or_init(|| Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s*)?(\w+)").unwrap())),
        "javascript" | "typescript" | "java" | "c" | "cpp" => Some(C_LIKE.get_or_init(|| {
            Regex::new(r"(?m)^(?:\s*)(?:export\s+)?(?:public\s+|private\s+|protected\s+)?(?:static\s+)?(?:async\s+)?(?:function\s+(\w+)|class\s+(\w+))")
                .unwrap()
        })),
        _ => None,
    }
}

fn find_boundaries(code: &str, language: &str) -> Vec<Boundary> {
    let Some(pattern) = boundary_pattern(language) else {
        return Vec::new();
    };

    let lines: Vec<&str> = code.lines().collect();
    let mut boundaries = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(captures) = pattern.captures(line) {
            let symbol = captures
                .iter()
                .skip(1)
                .find_map(|m| m.map(|m| m.as_str().to_string()));
            boundaries.push(Boundary {
                start_line: i,
                symbol,
            });
        }
    }

    boundaries
}

fn extract_file_docstring(code: &str, language: &str) -> Option<String> {
    if language == "python" {
        let trimmed = code.trim_start();
        for quote in ["\"\"\"", "'''"] {
            if let Some(rest) = trimmed.strip_prefix(quote) {
                if let Some(end) = rest.find(quote) {
                    return Some(rest[..end].trim().to_string());
                }
            }
        }
        return None;
    }

    let mut lines_scanned = 0;
    let mut comment_lines = Vec::new();
    for line in code.lines().take(20) {
        lines_scanned += 1;
        let trimmed = line.trim();
        if trimmed.starts_with("//") {
            comment_lines.push(trimmed.trim_start_matches('/').trim());
        } else if trimmed.starts_with("/*") || trimmed.starts_with('*') || trimmed.ends_with("*/") {
            comment_lines.push(trimmed.trim_start_matches("/*").trim_start_matches('*').trim_end_matches("*/").trim());
        } else if !trimmed.is_empty() {
            break;
        }
        if lines_scanned >= 20 {
            break;
        }
    }

    if comment_lines.is_empty() {
        None
    } else {
        Some(comment_lines.join(" ").trim().to_string())
    }
}

/// `CodeChunker` that detects function/class boundaries with a
/// language-specific regex, falling back to a recursive character split
/// for languages without a pattern or sections with no detected boundary.
#[derive(Default)]
pub struct RegexCodeChunker;

impl RegexCodeChunker {
    /// Build a new chunker.
    pub fn new() -> Self {
        Self
    }
}

impl CodeChunker for RegexCodeChunker {
    fn chunk(&self, code: &str, file_path: &str, language: &str) -> Result<Vec<Chunk>> {
        let file_docstring = extract_file_docstring(code, language);
        let boundaries = find_boundaries(code, language);
        let lines: Vec<&str> = code.lines().collect();

        let sections: Vec<(Option<String>, Option<String>, String)> = if boundaries.is_empty() {
            vec![(None, None, code.to_string())]
        } else {
            let mut sections = Vec::new();
            for (i, boundary) in boundaries.iter().enumerate() {
                let end = boundaries.get(i + 1).map(|b| b.start_line).unwrap_or(lines.len());
                let body = lines[boundary.start_line..end].join("\n");
                let class_context = enclosing_class(&lines, boundary.start_line, language);
                sections.push((boundary.symbol.clone(), class_context, body));
            }
            sections
        };

        let mut chunks = Vec::new();
        let mut ordinal = 0u32;

        for (symbol, class_context, body) in sections {
            let pieces = recursive_split(body.trim(), CHUNK_TARGET_SIZE, CHUNK_OVERLAP_SIZE);

            for piece in pieces {
                let trimmed = piece.trim();
                if trimmed.chars().count() < INDEXING_CHUNK_MIN_LENGTH {
                    continue;
                }
                if trimmed.lines().count() < INDEXING_CHUNK_MIN_LINES {
                    continue;
                }

                let mut prefix_parts = vec![file_path.to_string()];
                if let Some(class_name) = &class_context {
                    prefix_parts.push(class_name.clone());
                }
                if let Some(symbol) = &symbol {
                    if class_context.as_deref() != Some(symbol.as_str()) {
                        prefix_parts.push(symbol.clone());
                    }
                }
                let enhanced_content = format!("[{}]\n\n{}", prefix_parts.join(" > "), piece);

                chunks.push(Chunk {
                    id: Chunk::derive_id(file_path, ordinal),
                    content: piece,
                    enhanced_content,
                    file_path: file_path.to_string(),
                    ordinal,
                    kind: ChunkKind::Code,
                    language: Some(language.to_string()),
                    heading_hierarchy: Vec::new(),
                    heading: None,
                    symbol: symbol.clone(),
                    file_docstring: file_docstring.clone(),
                    class_context: class_context.clone(),
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
    fn detects_rust_function_boundaries() {
        let code = "fn one() {\n    let result = compute_something();\n    result\n}\n\nfn two() {\n    let other = compute_other_thing();\n    other\n}\n";
        let chunker = RegexCodeChunker::new();
        let chunks = chunker.chunk(code, "lib.rs", "rust").unwrap();
        let symbols: Vec<_> = chunks.iter().filter_map(|c| c.symbol.clone()).collect();
        assert!(symbols.contains(&"one".to_string()));
        assert!(symbols.contains(&"two".to_string()));
    }

    #[test]
    fn unsupported_language_falls_back_to_flat_split() {
        let code = "some code in a language with no known boundary pattern\nthat is long enough to matter across two lines";
        let chunker = RegexCodeChunker::new();
        let chunks = chunker.chunk(code, "f.weird", "cobol").unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].symbol.is_none());
    }

    #[test]
    fn extracts_c_style_leading_comment_as_file_docstring() {
        let code = "// Handles widget dispatch.\n// Thread-safe.\nfn dispatch() {\n    let queue = acquire_dispatch_queue();\n    queue.run()\n}\n";
        let chunker = RegexCodeChunker::new();
        let chunks = chunker.chunk(code, "dispatch.rs", "rust").unwrap();
        assert!(chunks[0].file_docstring.is_some());
    }

    #[test]
    fn single_line_statements_below_min_lines_are_dropped() {
        let code = "fn a() { 1 }\n";
        let chunker = RegexCodeChunker::new();
        let chunks = chunker.chunk(code, "a.rs", "rust").unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn methods_infer_their_enclosing_class() {
        let code = "class Widget:\n    \"\"\"A widget.\"\"\"\n\n    def run(self):\n        return compute_widget_value(self)\n\n    def stop(self):\n        return None\n";
        let chunker = RegexCodeChunker::new();
        let chunks = chunker.chunk(code, "test.py", "python").unwrap();

        let class_chunk = chunks.iter().find(|c| c.symbol.as_deref() == Some("Widget")).unwrap();
        assert!(class_chunk.class_context.is_none());

        let run = chunks.iter().find(|c| c.symbol.as_deref() == Some("run")).unwrap();
        assert_eq!(run.class_context.as_deref(), Some("Widget"));

        let stop = chunks.iter().find(|c| c.symbol.as_deref() == Some("stop")).unwrap();
        assert_eq!(stop.class_context.as_deref(), Some("Widget"));
    }

    #[test]
    fn breadcrumb_carries_file_name_class_and_symbol() {
        let code = "class Widget:\n    \"\"\"A widget.\"\"\"\n\n    def run(self):\n        return compute_widget_value(self)\n";
        let chunker = RegexCodeChunker::new();
        let chunks = chunker.chunk(code, "test.py", "python").unwrap();

        let run = chunks.iter().find(|c| c.symbol.as_deref() == Some("run")).unwrap();
        assert!(run.enhanced_content.starts_with("[test.py > Widget > run]"));
    }
}
