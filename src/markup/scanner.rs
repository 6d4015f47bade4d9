// src/markup/scanner.rs
// Single-pass scanner for the bracket markup. Leftmost non-overlapping
// matches; anything that does not satisfy the grammar stays literal text.

use super::{ErrorCategory, Segment};

/// Split an annotated transcript into plain and error segments.
///
/// The grammar is `[phrase|category]` or `[phrase|category|original]`, where
/// `phrase` and `original` may contain any character except `[`, `|` and `]`.
/// A `[` that does not open a well-formed annotation is ordinary text, and
/// scanning resumes at the following character so a later annotation inside
/// the rejected span is still found. Concatenating the `text` and `phrase`
/// fields of the output in order reproduces the input with only the markup
/// syntax removed.
pub fn parse(input: &str) -> Vec<Segment> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'[' {
            pos += 1;
            continue;
        }
        match annotation_at(input, pos) {
            Some((segment, end)) => {
                if pos > plain_start {
                    segments.push(Segment::Plain {
                        text: input[plain_start..pos].to_string(),
                    });
                }
                segments.push(segment);
                pos = end;
                plain_start = end;
            }
            None => pos += 1,
        }
    }

    if plain_start < input.len() {
        segments.push(Segment::Plain {
            text: input[plain_start..].to_string(),
        });
    }

    segments
}

/// Try to read one annotation whose `[` sits at byte `open`. Returns the
/// segment and the byte offset just past the closing `]`.
fn annotation_at(input: &str, open: usize) -> Option<(Segment, usize)> {
    let bytes = input.as_bytes();

    let phrase_start = open + 1;
    let phrase_end = span_end(bytes, phrase_start)?;
    if bytes[phrase_end] != b'|' {
        return None;
    }

    let category_start = phrase_end + 1;
    let category_end = span_end(bytes, category_start)?;
    let category = ErrorCategory::from_token(&input[category_start..category_end])?;

    let (original, close) = match bytes[category_end] {
        b']' => (None, category_end),
        b'|' => {
            let original_start = category_end + 1;
            let original_end = span_end(bytes, original_start)?;
            if bytes[original_end] != b']' {
                return None;
            }
            (Some(input[original_start..original_end].to_string()), original_end)
        }
        _ => return None,
    };

    let segment = Segment::Error {
        phrase: input[phrase_start..phrase_end].to_string(),
        category,
        original: if category.keeps_original() { original } else { None },
    };
    Some((segment, close + 1))
}

/// Advance over a (possibly empty) span of non-delimiter bytes starting at
/// `pos` and return the offset of the delimiter that ends it. `[` inside a
/// span, or running off the end of the input, rejects the annotation. The
/// delimiters are all ASCII, so byte offsets here are always char boundaries.
fn span_end(bytes: &[u8], mut pos: usize) -> Option<usize> {
    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => return None,
            b'|' | b']' => return Some(pos),
            _ => pos += 1,
        }
    }
    None
}
