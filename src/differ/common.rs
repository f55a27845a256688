//! Shared string primitives used by the differ and the cleanup passes.
//!
//! All lengths returned here are byte lengths that fall on char boundaries
//! of both inputs, so callers can slice with them directly.

/// Length of the common prefix of two strings
pub fn common_prefix(text1: &str, text2: &str) -> usize {
    text1
        .chars()
        .zip(text2.chars())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

/// Length of the common suffix of two strings
pub fn common_suffix(text1: &str, text2: &str) -> usize {
    text1
        .chars()
        .rev()
        .zip(text2.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

/// Length of the longest prefix of `text2` that is also a suffix of `text1`
pub fn common_overlap(text1: &str, text2: &str) -> usize {
    let a = text1.as_bytes();
    let b = text2.as_bytes();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Only the last `len` bytes of text1 and the first `len` bytes of text2 can overlap
    let len = a.len().min(b.len());
    let a = &a[a.len() - len..];
    let b = &b[..len];

    if a == b && text2.is_char_boundary(len) {
        return len;
    }

    // Grow a candidate suffix of `a` and look for it in `b`; each hit tells us how far
    // the next possible overlap is, so we never test lengths that cannot match.
    let mut best = 0;
    let mut length = 1;
    loop {
        let pattern = &a[len - length..];
        let Some(found) = find_bytes(b, pattern) else {
            return best;
        };
        length += found;
        if length > len {
            return best;
        }
        if found == 0 || a[len - length..] == b[..length] {
            if text2.is_char_boundary(length) {
                best = length;
            }
            length += 1;
            if length > len {
                return best;
            }
        }
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Byte offset of the `n`th char, or `None` when the text is shorter
pub(crate) fn char_offset(text: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    let mut count = 0;
    for (i, _) in text.char_indices() {
        if count == n {
            return Some(i);
        }
        count += 1;
    }
    (count == n).then_some(text.len())
}
