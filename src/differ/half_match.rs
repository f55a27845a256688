use super::common::{char_offset, common_prefix, common_suffix};

/// Texts shorter than this never get split; the overhead isn't worth it
const MIN_HALF_MATCH_LEN: usize = 4;

/// A common substring shared by both texts, with what surrounds it on each side.
///
/// `prefix1`/`suffix1` are taken from the first text and `prefix2`/`suffix2`
/// from the second one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalfMatchResult {
    pub prefix1: String,
    pub suffix1: String,
    pub prefix2: String,
    pub suffix2: String,
    pub common_middle: String,
}

impl HalfMatchResult {
    /// True when no usable pivot was found
    pub fn is_empty(&self) -> bool {
        self.common_middle.is_empty()
    }

    /// A longer common middle is a better pivot
    pub fn is_better_than(&self, other: &HalfMatchResult) -> bool {
        self.common_middle.chars().count() > other.common_middle.chars().count()
    }

    /// Exchange the roles of the first and second text
    pub fn swap_roles(self) -> Self {
        Self {
            prefix1: self.prefix2,
            suffix1: self.suffix2,
            prefix2: self.prefix1,
            suffix2: self.suffix1,
            common_middle: self.common_middle,
        }
    }
}

/// Look for a substring at least half the length of the longer text that
/// both texts share.
///
/// Only pays off when the texts are of comparable size: if the longer one
/// is more than twice the shorter one, no such substring can exist. The
/// returned result keeps `text1` in the `*1` fields and `text2` in the `*2`
/// fields regardless of which one is longer.
pub fn half_match(text1: &str, text2: &str) -> HalfMatchResult {
    let len1 = text1.chars().count();
    let len2 = text2.chars().count();
    let text1_is_long = len1 > len2;
    let (long, short, long_len, short_len) = if text1_is_long {
        (text1, text2, len1, len2)
    } else {
        (text2, text1, len2, len1)
    };

    if long_len < MIN_HALF_MATCH_LEN || short_len * 2 < long_len {
        return HalfMatchResult::default();
    }

    // Probe with seeds taken from the second and the third quarter of the long text
    let first = half_match_at(long, short, long_len, long_len.div_ceil(4));
    let second = half_match_at(long, short, long_len, long_len.div_ceil(2));

    let best = match (first.is_empty(), second.is_empty()) {
        (true, true) => return HalfMatchResult::default(),
        (false, true) => first,
        (true, false) => second,
        (false, false) => {
            if first.is_better_than(&second) {
                first
            } else {
                second
            }
        }
    };

    if text1_is_long {
        best
    } else {
        best.swap_roles()
    }
}

/// Does a quarter-length seed of `long` starting at char `seed_start` extend
/// into a common substring covering at least half of `long`?
fn half_match_at(long: &str, short: &str, long_len: usize, seed_start: usize) -> HalfMatchResult {
    let (Some(start), Some(end)) = (
        char_offset(long, seed_start),
        char_offset(long, seed_start + long_len / 4),
    ) else {
        return HalfMatchResult::default();
    };
    let seed = &long[start..end];

    let mut best = HalfMatchResult::default();
    let mut best_len = 0;
    let mut from = 0;
    while let Some(pos) = short[from..].find(seed) {
        let j = from + pos;
        let prefix_len = common_prefix(&long[start..], &short[j..]);
        let suffix_len = common_suffix(&long[..start], &short[..j]);
        if best_len < prefix_len + suffix_len {
            best_len = prefix_len + suffix_len;
            best = HalfMatchResult {
                prefix1: long[..start - suffix_len].to_string(),
                suffix1: long[start + prefix_len..].to_string(),
                prefix2: short[..j - suffix_len].to_string(),
                suffix2: short[j + prefix_len..].to_string(),
                common_middle: short[j - suffix_len..j + prefix_len].to_string(),
            };
        }

        match short[j..].chars().next() {
            Some(c) => from = j + c.len_utf8(),
            None => break,
        }
    }

    if best.common_middle.chars().count() * 2 >= long_len {
        best
    } else {
        HalfMatchResult::default()
    }
}
