//! Word wrapping and ellipsis truncation against a pixel width.

/// Marker appended to text cut short.
pub const ELLIPSIS: &str = "...";

/// Greedy word wrap so no line measures wider than `max_width`.
///
/// Words that are wider than a whole line on their own are broken between
/// characters.
pub fn wrap(text: &str, max_width: u32, measure: &dyn Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate =
            if current.is_empty() { word.to_string() } else { format!("{current} {word}") };
        if measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure(word) <= max_width {
            current = word.to_string();
        } else {
            let mut pieces = break_word(word, max_width, measure);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split an over-wide word into chunks that each fit. A single character
/// always forms a chunk, even if it is too wide.
fn break_word(word: &str, max_width: u32, measure: &dyn Fn(&str) -> u32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if measure(&piece) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Keep at most `max_lines` lines; if any were dropped, end the last kept
/// line with an ellipsis. Returns whether truncation happened.
pub fn fit_lines(
    mut lines: Vec<String>,
    max_lines: usize,
    max_width: u32,
    measure: &dyn Fn(&str) -> u32,
) -> (Vec<String>, bool) {
    if lines.len() <= max_lines {
        return (lines, false);
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.pop() {
        let shortened = with_ellipsis(&last, max_width, measure);
        if !shortened.is_empty() {
            lines.push(shortened);
        }
    }
    (lines, true)
}

/// Return `text` unchanged if it fits, else the longest prefix that fits
/// with an ellipsis appended.
pub fn ellipsize(text: &str, max_width: u32, measure: &dyn Fn(&str) -> u32) -> String {
    if measure(text) <= max_width {
        text.to_string()
    } else {
        with_ellipsis(text, max_width, measure)
    }
}

fn with_ellipsis(text: &str, max_width: u32, measure: &dyn Fn(&str) -> u32) -> String {
    let mut kept: Vec<char> = text.trim_end().chars().collect();
    loop {
        let prefix: String = kept.iter().collect();
        let candidate = format!("{}{ELLIPSIS}", prefix.trim_end());
        if measure(&candidate) <= max_width {
            return candidate;
        }
        if kept.pop().is_none() {
            return String::new();
        }
    }
}
