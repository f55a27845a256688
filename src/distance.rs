use crate::{DiffOperation, TextDiffer};

/// Compute the Levenshtein distance implied by a diff: the number of inserted,
/// deleted or substituted chars.
///
/// A deletion and an insertion between the same two equalities count as
/// substitutions, so only the larger of the two is added.
pub fn levenshtein(diffs: &[TextDiffer]) -> usize {
    let mut distance = 0;
    let mut insertions = 0;
    let mut deletions = 0;

    for diff in diffs {
        match diff.operation {
            DiffOperation::Insert => insertions += diff.char_len(),
            DiffOperation::Delete => deletions += diff.char_len(),
            DiffOperation::Equal => {
                distance += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    distance + insertions.max(deletions)
}

/// Map a char position in the old text to the equivalent position in the new
/// text, e.g. "The cat" vs "The big cat", 1->1, 5->9.
///
/// A position inside a deletion maps to where the deletion happened in the
/// new text.
pub fn find_equivalent_location2(diffs: &[TextDiffer], location1: usize) -> usize {
    let mut chars1 = 0;
    let mut chars2 = 0;
    let mut last_chars1 = 0;
    let mut last_chars2 = 0;
    let mut landed_on = None;

    for diff in diffs {
        let len = diff.char_len();
        if diff.operation != DiffOperation::Insert {
            chars1 += len;
        }
        if diff.operation != DiffOperation::Delete {
            chars2 += len;
        }
        if chars1 > location1 {
            landed_on = Some(diff.operation);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }

    match landed_on {
        // the location was deleted
        Some(DiffOperation::Delete) => last_chars2,
        _ => last_chars2 + (location1 - last_chars1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        let diffs = [
            TextDiffer::delete("abc"),
            TextDiffer::insert("1234"),
            TextDiffer::equal("xyz"),
        ];
        assert_eq!(levenshtein(&diffs), 4);

        let diffs = [
            TextDiffer::equal("xyz"),
            TextDiffer::delete("abc"),
            TextDiffer::insert("1234"),
        ];
        assert_eq!(levenshtein(&diffs), 4);

        let diffs = [
            TextDiffer::delete("abc"),
            TextDiffer::equal("xyz"),
            TextDiffer::insert("1234"),
        ];
        assert_eq!(levenshtein(&diffs), 7);
    }

    #[test]
    fn test_levenshtein_counts_chars() {
        let diffs = [TextDiffer::delete("ü"), TextDiffer::insert("ñö"), TextDiffer::equal("x")];
        assert_eq!(levenshtein(&diffs), 2);
        assert_eq!(levenshtein(&[]), 0);
        assert_eq!(levenshtein(&[TextDiffer::equal("same")]), 0);
    }

    #[test]
    fn test_equivalent_location() {
        let diffs = [
            TextDiffer::delete("a"),
            TextDiffer::insert("1234"),
            TextDiffer::equal("xyz"),
        ];
        assert_eq!(find_equivalent_location2(&diffs, 2), 5);

        let diffs = [
            TextDiffer::equal("a"),
            TextDiffer::delete("1234"),
            TextDiffer::equal("xyz"),
        ];
        assert_eq!(find_equivalent_location2(&diffs, 3), 1);
    }

    #[test]
    fn test_equivalent_location_cat() {
        let diffs = [
            TextDiffer::equal("The "),
            TextDiffer::insert("big "),
            TextDiffer::equal("cat"),
        ];
        assert_eq!(find_equivalent_location2(&diffs, 1), 1);
        assert_eq!(find_equivalent_location2(&diffs, 5), 9);
        assert_eq!(find_equivalent_location2(&diffs, 7), 11);
    }

    #[test]
    fn test_equivalent_location_leading_insert() {
        // text inserted before position 0 pushes it along
        let diffs = [TextDiffer::insert("ab"), TextDiffer::equal("c")];
        assert_eq!(find_equivalent_location2(&diffs, 0), 2);
        assert_eq!(find_equivalent_location2(&diffs, 1), 3);
    }
}
