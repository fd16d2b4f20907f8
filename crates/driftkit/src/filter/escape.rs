//! Dot-delimited splitting with backslash escapes
//!
//! `\.` is a literal dot and `\\` a literal backslash, so `\\.` is a
//! backslash followed by a splitting dot. A dot in the first position never
//! splits, and a splitting dot at the end of the line does not open an empty
//! trailing segment.

/// Split a rule line into unescaped segments.
pub fn escapable_split(line: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut ended_on_split = true;
    let mut chars = line.chars().enumerate();

    while let Some((i, c)) = chars.next() {
        ended_on_split = false;
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => current.push(escaped),
                None => current.push('\\'),
            },
            '.' if i > 0 => {
                segments.push(std::mem::take(&mut current));
                ended_on_split = true;
            }
            _ => current.push(c),
        }
    }

    if !ended_on_split {
        segments.push(current);
    }
    segments
}

/// Escape a single segment so it survives [`escapable_split`].
pub fn escape_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == '\\' || c == '.' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Join segments with dots, escaping each of them.
pub fn join_escaped<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| escape_segment(s.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}
