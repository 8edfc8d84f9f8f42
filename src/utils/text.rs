//! Size-bounded text rendering.

use anyhow::Result;

/// Truncate `text` so that its escaped form fits within `max_bytes` bytes,
/// preserving as much leading content as fits.
///
/// Escaping can expand text, so the budget is checked against the escaped
/// output rather than the input. Truncation always lands on a char
/// boundary of the input.
pub fn render_size<F>(max_bytes: usize, text: &str, escape: F) -> Result<String>
where
    F: Fn(&str) -> Result<String>,
{
    let full = escape(text)?;
    if full.len() <= max_bytes {
        return Ok(full);
    }

    // Binary search for the longest prefix whose escaped form fits.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut best = String::new();
    let mut lo = 0;
    let mut hi = boundaries.len() - 1;
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        let candidate = escape(&text[..boundaries[mid]])?;
        if candidate.len() <= max_bytes {
            best = candidate;
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    Ok(best)
}
