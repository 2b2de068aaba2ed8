//! Recursive character splitter shared by the document and code chunkers.
//!
//! Cascades through separators from coarsest to finest — paragraph breaks,
//! then line breaks, then spaces, then raw characters — splitting only as
//! finely as needed to bring every piece under `target_size`.

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Split `text` into pieces no longer than `target_size` characters, with
/// `overlap` characters of trailing context repeated at the start of each
/// piece after the first.
pub fn recursive_split(text: &str, target_size: usize, overlap: usize) -> Vec<String> {
    let pieces = split_recursive(text, target_size, 0);
    apply_overlap(pieces, overlap)
}

fn split_recursive(text: &str, target_size: usize, separator_index: usize) -> Vec<String> {
    if text.chars().count() <= target_size {
        return vec![text.to_string()];
    }

    let Some(separator) = SEPARATORS.get(separator_index) else {
        return hard_split(text, target_size);
    };

    if separator.is_empty() {
        return hard_split(text, target_size);
    }

    let segments: Vec<&str> = text.split(*separator).collect();
    if segments.len() == 1 {
        return split_recursive(text, target_size, separator_index + 1);
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for segment in segments {
        let candidate = if current.is_empty() {
            segment.to_string()
        } else {
            format!("{current}{separator}{segment}")
        };

        if candidate.chars().count() <= target_size {
            current = candidate;
        } else {
            if !current.is_empty() {
                pieces.push(current);
            }
            if segment.chars().count() > target_size {
                pieces.extend(split_recursive(segment, target_size, separator_index + 1));
                current = String::new();
            } else {
                current = segment.to_string();
            }
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

fn hard_split(text: &str, target_size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<char>>()
        .chunks(target_size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn apply_overlap(pieces: Vec<String>, overlap: usize) -> Vec<String> {
    if overlap == 0 || pieces.len() < 2 {
        return pieces;
    }

    let mut result = Vec::with_capacity(pieces.len());
    let mut previous_tail = String::new();

    for piece in pieces {
        let with_overlap = if previous_tail.is_empty() {
            piece.clone()
        } else {
            format!("{previous_tail}{piece}")
        };

        let tail_start = piece.chars().count().saturating_sub(overlap);
        previous_tail = piece.chars().skip(tail_start).collect();

        result.push(with_overlap);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_split() {
        let pieces = recursive_split("short text", 100, 0);
        assert_eq!(pieces, vec!["short text".to_string()]);
    }

    #[test]
    fn splits_on_paragraph_boundaries_first() {
        let text = "para one.\n\npara two.\n\npara three is long enough to force a split on its own when combined";
        let pieces = recursive_split(text, 40, 0);
        assert!(pieces.len() > 1);
    }

    #[test]
    fn falls_back_to_hard_split_for_unbroken_text() {
        let text = "a".repeat(500);
        let pieces = recursive_split(&text, 100, 0);
        assert!(pieces.iter().all(|p| p.chars().count() <= 100));
    }
}
