//! Reply splitting — where to cut a long reply so it reads like two
//! consecutive human messages.
//!
//! A reply longer than [`SPLIT_THRESHOLD`] characters is scanned backward
//! from the threshold for a natural boundary: first a sentence terminator
//! followed by whitespace, then a bare newline. The scan never goes below
//! 60% of the threshold, so the first chunk stays a substantial message.
//! Pure and deterministic; all indices are character offsets.

/// Replies at most this many characters long are never split.
pub const SPLIT_THRESHOLD: usize = 280;

/// Lower bound of the boundary search window, as a fraction of the
/// threshold.
const SEARCH_FLOOR_RATIO: f64 = 0.6;

/// The delivery decision for one completed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitDecision {
    /// Deliver the whole reply as one message.
    Single(String),
    /// Deliver `first` immediately and `second` after the stagger delay.
    Staggered { first: String, second: String },
}

/// Find the character index to split at, or `None` for no split.
///
/// Scans backward from `max_len` down to `floor(max_len * 0.6)`, first for
/// a `.`, `!`, or `?` whose next character is a space, newline, or the end
/// of the string (returning the index just after the terminator), then for
/// a bare newline (returning the index just after it). Prefers the latest
/// valid boundary at or below `max_len`.
pub fn find_split_index(text: &str, max_len: usize) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return None;
    }

    let floor = (max_len as f64 * SEARCH_FLOOR_RATIO).floor() as usize;

    for i in (floor..=max_len).rev() {
        if matches!(chars[i], '.' | '!' | '?') {
            let next_ok = match chars.get(i + 1) {
                Some(&c) => c == ' ' || c == '\n',
                None => true,
            };
            if next_ok {
                return Some(i + 1);
            }
        }
    }

    for i in (floor..=max_len).rev() {
        if chars[i] == '\n' {
            return Some(i + 1);
        }
    }

    None
}

/// Decide how a completed reply is delivered.
///
/// Applies [`find_split_index`] at [`SPLIT_THRESHOLD`], trims both chunks,
/// and falls back to a single message when either chunk trims to nothing.
pub fn split_reply(text: &str) -> SplitDecision {
    let Some(split_at) = find_split_index(text, SPLIT_THRESHOLD) else {
        return SplitDecision::Single(text.to_string());
    };

    let byte_idx = text
        .char_indices()
        .nth(split_at)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let first = text[..byte_idx].trim();
    let second = text[byte_idx..].trim();

    if first.is_empty() || second.is_empty() {
        return SplitDecision::Single(text.to_string());
    }

    SplitDecision::Staggered {
        first: first.to_string(),
        second: second.to_string(),
    }
}
