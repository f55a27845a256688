use tracing::trace;

use crate::differ::common_suffix;
use crate::{DiffOperation, TextDiffer};

/// Slide single edits surrounded by equalities sideways so that they line up
/// with word, line or paragraph boundaries, e.g. `The c<at c>ame.` becomes
/// `The <cat >came.`. What is inserted or deleted never changes, only where
/// it sits.
pub fn cleanup_semantic_lossless(diffs: Vec<TextDiffer>) -> Vec<TextDiffer> {
    let mut out: Vec<TextDiffer> = Vec::with_capacity(diffs.len());
    let mut moved = 0usize;
    let mut iter = diffs.into_iter().peekable();

    while let Some(current) = iter.next() {
        let sandwiched = current.operation.is_edit()
            && matches!(out.last(), Some(d) if d.operation == DiffOperation::Equal)
            && matches!(iter.peek(), Some(d) if d.operation == DiffOperation::Equal);
        if !sandwiched {
            out.push(current);
            continue;
        }

        let (Some(previous), Some(next)) = (out.pop(), iter.next()) else {
            out.push(current);
            continue;
        };
        let (equality1, edit, equality2) = best_alignment(previous.text, current.text, next.text);
        if !equality1.is_empty() {
            out.push(TextDiffer::equal(equality1));
        }
        out.push(TextDiffer::new(current.operation, edit));
        // becomes the left equality of the next window
        if !equality2.is_empty() {
            out.push(TextDiffer::equal(equality2));
        }
        moved += 1;
    }

    trace!(windows = moved, "cleanup_semantic_lossless");
    out
}

/// Find the position of `edit` between its two equalities with the best
/// boundary score.
fn best_alignment(
    mut equality1: String,
    mut edit: String,
    mut equality2: String,
) -> (String, String, String) {
    // First, shift the edit as far left as possible
    let offset = common_suffix(&equality1, &edit);
    if offset > 0 {
        let common = edit[edit.len() - offset..].to_string();
        equality1.truncate(equality1.len() - offset);
        edit = format!("{}{}", common, &edit[..edit.len() - offset]);
        equality2.insert_str(0, &common);
    }

    // Second, step right one char at a time looking for the best fit
    let mut best = (equality1.clone(), edit.clone(), equality2.clone());
    let mut best_score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
    loop {
        let (Some(c), Some(d)) = (edit.chars().next(), equality2.chars().next()) else {
            break;
        };
        if c != d {
            break;
        }
        equality1.push(c);
        edit.drain(..c.len_utf8());
        edit.push(c);
        equality2.drain(..c.len_utf8());

        let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
        // >= prefers trailing over leading whitespace on edits
        if score >= best_score {
            best_score = score;
            best = (equality1.clone(), edit.clone(), equality2.clone());
        }
    }
    best
}

/// Score how good a split between `left` and `right` is, from 6 (edge of the
/// text) down to 0 (in the middle of a word).
pub(crate) fn boundary_score(left: &str, right: &str) -> u8 {
    let (Some(char1), Some(char2)) = (left.chars().next_back(), right.chars().next()) else {
        return 6;
    };

    let non_alphanumeric1 = !char1.is_alphanumeric();
    let non_alphanumeric2 = !char2.is_alphanumeric();
    let whitespace1 = non_alphanumeric1 && char1.is_whitespace();
    let whitespace2 = non_alphanumeric2 && char2.is_whitespace();
    let line_break1 = whitespace1 && matches!(char1, '\r' | '\n');
    let line_break2 = whitespace2 && matches!(char2, '\r' | '\n');
    let blank_line1 = line_break1 && (left.ends_with("\n\n") || left.ends_with("\n\r\n"));
    let blank_line2 = line_break2
        && ["\n\n", "\n\r\n", "\r\n\n", "\r\n\r\n"]
            .iter()
            .any(|p| right.starts_with(p));

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alphanumeric1 && !whitespace1 && whitespace2 {
        // end of sentence
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alphanumeric1 || non_alphanumeric2 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(op: char, text: &str) -> TextDiffer {
        TextDiffer::new(DiffOperation::from_char(op).unwrap(), text)
    }

    #[test]
    fn test_lossless_empty() {
        assert_eq!(cleanup_semantic_lossless(vec![]), vec![]);
    }

    #[test]
    fn test_lossless_blank_lines() {
        assert_eq!(
            cleanup_semantic_lossless(vec![
                d('=', "AAA\r\n\r\nBBB"),
                d('+', "\r\nDDD\r\n\r\nBBB"),
                d('=', "\r\nEEE"),
            ]),
            vec![
                d('=', "AAA\r\n\r\n"),
                d('+', "BBB\r\nDDD\r\n\r\n"),
                d('=', "BBB\r\nEEE"),
            ]
        );
    }

    #[test]
    fn test_lossless_line_boundaries() {
        assert_eq!(
            cleanup_semantic_lossless(vec![
                d('=', "AAA\r\nBBB"),
                d('+', " DDD\r\nBBB"),
                d('=', " EEE"),
            ]),
            vec![
                d('=', "AAA\r\n"),
                d('+', "BBB DDD\r\n"),
                d('=', "BBB EEE"),
            ]
        );
    }

    #[test]
    fn test_lossless_word_boundaries() {
        assert_eq!(
            cleanup_semantic_lossless(vec![d('=', "The c"), d('+', "ow and the c"), d('=', "at.")]),
            vec![d('=', "The "), d('+', "cow and the "), d('=', "cat.")]
        );
        assert_eq!(
            cleanup_semantic_lossless(vec![d('=', "The c"), d('-', "at c"), d('=', "ame.")]),
            vec![d('=', "The "), d('-', "cat "), d('=', "came.")]
        );
    }

    #[test]
    fn test_lossless_alphanumeric_boundaries() {
        assert_eq!(
            cleanup_semantic_lossless(vec![d('=', "The-c"), d('+', "ow-and-the-c"), d('=', "at.")]),
            vec![d('=', "The-"), d('+', "cow-and-the-"), d('=', "cat.")]
        );
    }

    #[test]
    fn test_lossless_hitting_the_edges() {
        assert_eq!(
            cleanup_semantic_lossless(vec![d('=', "a"), d('-', "a"), d('=', "ax")]),
            vec![d('-', "a"), d('=', "aax")]
        );
        assert_eq!(
            cleanup_semantic_lossless(vec![d('=', "xa"), d('-', "a"), d('=', "a")]),
            vec![d('=', "xaa"), d('-', "a")]
        );
    }

    #[test]
    fn test_lossless_sentence_boundaries() {
        assert_eq!(
            cleanup_semantic_lossless(vec![
                d('=', "The xxx. The "),
                d('+', "zzz. The "),
                d('=', "yyy."),
            ]),
            vec![
                d('=', "The xxx."),
                d('+', " The zzz."),
                d('=', " The yyy."),
            ]
        );
    }

    #[test]
    fn test_boundary_scores() {
        assert_eq!(boundary_score("", "abc"), 6);
        assert_eq!(boundary_score("a\n\n", "b"), 5);
        assert_eq!(boundary_score("a", "\r\n\r\nb"), 5);
        assert_eq!(boundary_score("a\n", "b"), 4);
        assert_eq!(boundary_score("end.", " next"), 3);
        assert_eq!(boundary_score("a ", "b"), 2);
        assert_eq!(boundary_score("a-", "b"), 1);
        assert_eq!(boundary_score("ab", "cd"), 0);
    }
}
