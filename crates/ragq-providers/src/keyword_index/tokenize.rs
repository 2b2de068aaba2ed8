//! Tokenization for the BM25 index: CJK content is pre-segmented with
//! `jieba-rs`, everything else goes through lowercase splitting and Porter
//! stemming.

use rust_stemmers::{Algorithm, Stemmer};

use crate::constants::BM25_TOKEN_MIN_LENGTH;

/// Whether `text` contains enough CJK characters to be treated as
/// CJK content rather than stemmed Latin-script text.
fn is_cjk(text: &str) -> bool {
    let mut cjk = 0usize;
    let mut total = 0usize;
    for c in text.chars() {
        if c.is_alphanumeric() {
            total += 1;
            if matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x3040..=0x30FF | 0xAC00..=0xD7A3) {
                cjk += 1;
            }
        }
    }
    total > 0 && cjk * 2 >= total
}

/// Tokenize `text` into terms suitable for BM25 indexing/scoring.
pub fn tokenize(text: &str) -> Vec<String> {
    if is_cjk(text) {
        tokenize_cjk(text)
    } else {
        tokenize_latin(text)
    }
}

fn tokenize_cjk(text: &str) -> Vec<String> {
    let jieba = jieba_rs::Jieba::new();
    jieba
        .cut(text, false)
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && s.chars().any(char::is_alphanumeric))
        .collect()
}

fn tokenize_latin(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|word| word.len() > BM25_TOKEN_MIN_LENGTH)
        .map(|word| stemmer.stem(word).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_tokens_are_stemmed() {
        let tokens = tokenize("running runners");
        assert!(tokens.iter().all(|t| t.starts_with("run")));
    }

    #[test]
    fn short_tokens_are_dropped() {
        let tokens = tokenize("a an if of");
        assert!(tokens.is_empty());
    }

    #[test]
    fn cjk_text_is_segmented() {
        let tokens = tokenize("我爱自然语言处理");
        assert!(!tokens.is_empty());
    }
}
