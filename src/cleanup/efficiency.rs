use tracing::trace;

use super::{cleanup_merge, compact, Slot};
use crate::{DiffOperation, TextDiffer};

/// Which kinds of edit border the last candidate equality
#[derive(Debug, Default, Clone, Copy)]
struct Neighbours {
    pre_insert: bool,
    pre_delete: bool,
    post_insert: bool,
    post_delete: bool,
}

impl Neighbours {
    fn count(&self) -> usize {
        [
            self.pre_insert,
            self.pre_delete,
            self.post_insert,
            self.post_delete,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count()
    }

    fn mark(&mut self, operation: DiffOperation) {
        match operation {
            DiffOperation::Delete => self.post_delete = true,
            DiffOperation::Insert => self.post_insert = true,
            DiffOperation::Equal => {}
        }
    }

    fn clear_post(&mut self) {
        self.post_insert = false;
        self.post_delete = false;
    }
}

/// Reduce the number of edits by eliminating operationally trivial
/// equalities, i.e. equalities that cost more to keep than to replace.
///
/// An equality shorter than `edit_cost` chars is dropped when it is wedged
/// between an insertion and a deletion on both sides
/// (`<ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>`), or when it is
/// shorter than half of `edit_cost` and three of those four edits are
/// present (`<ins>A</ins>X<ins>C</ins><del>D</del>`).
pub fn cleanup_efficiency(diffs: Vec<TextDiffer>, edit_cost: usize) -> Vec<TextDiffer> {
    let mut slots: Vec<Slot> = diffs.into_iter().map(Slot::Kept).collect();
    let mut equalities: Vec<usize> = Vec::new();
    // char length of the last candidate equality
    let mut last_equality: Option<usize> = None;
    let mut flags = Neighbours::default();
    let mut changed = false;
    let mut pointer = 0;

    while pointer < slots.len() {
        let edits = match &slots[pointer] {
            Slot::Kept(diff) if diff.operation == DiffOperation::Equal => {
                let len = diff.char_len();
                if len < edit_cost && (flags.post_insert || flags.post_delete) {
                    // candidate found
                    equalities.push(pointer);
                    flags.pre_insert = flags.post_insert;
                    flags.pre_delete = flags.post_delete;
                    last_equality = Some(len);
                } else {
                    // not a candidate, and can never become one
                    equalities.clear();
                    last_equality = None;
                }
                flags.clear_post();
                pointer += 1;
                continue;
            }
            Slot::Kept(diff) => vec![diff.operation],
            Slot::Split(_) => vec![DiffOperation::Delete, DiffOperation::Insert],
        };

        let mut restart = None;
        for operation in edits {
            flags.mark(operation);
            let Some(equality_len) = last_equality else {
                continue;
            };
            let count = flags.count();
            if count == 4 || (equality_len * 2 < edit_cost && count == 3) {
                if let Some(index) = equalities.pop() {
                    slots[index].split();
                }
                last_equality = None;
                changed = true;
                if flags.pre_insert && flags.pre_delete {
                    // no changes made which could affect previous entry, keep going
                    flags.post_insert = true;
                    flags.post_delete = true;
                    equalities.clear();
                } else {
                    equalities.pop();
                    restart = Some(equalities.last().map_or(0, |&index| index + 1));
                    flags.clear_post();
                }
                break;
            }
        }
        pointer = restart.unwrap_or(pointer + 1);
    }

    trace!(changed, edit_cost, "cleanup_efficiency");
    let diffs = compact(slots);
    if changed {
        cleanup_merge(diffs)
    } else {
        diffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::DEFAULT_EDIT_COST;

    fn d(op: char, text: &str) -> TextDiffer {
        TextDiffer::new(DiffOperation::from_char(op).unwrap(), text)
    }

    #[test]
    fn test_efficiency_empty() {
        assert_eq!(cleanup_efficiency(vec![], DEFAULT_EDIT_COST), vec![]);
    }

    #[test]
    fn test_efficiency_no_elimination() {
        let diffs = vec![d('-', "ab"), d('+', "12"), d('=', "wxyz"), d('-', "cd"), d('+', "34")];
        assert_eq!(cleanup_efficiency(diffs.clone(), DEFAULT_EDIT_COST), diffs);
    }

    #[test]
    fn test_efficiency_four_edit_elimination() {
        assert_eq!(
            cleanup_efficiency(
                vec![d('-', "ab"), d('+', "12"), d('=', "xyz"), d('-', "cd"), d('+', "34")],
                DEFAULT_EDIT_COST
            ),
            vec![d('-', "abxyzcd"), d('+', "12xyz34")]
        );
    }

    #[test]
    fn test_efficiency_three_edit_elimination() {
        assert_eq!(
            cleanup_efficiency(
                vec![d('+', "12"), d('=', "x"), d('-', "cd"), d('+', "34")],
                DEFAULT_EDIT_COST
            ),
            vec![d('-', "xcd"), d('+', "12x34")]
        );
    }

    #[test]
    fn test_efficiency_backpass_elimination() {
        assert_eq!(
            cleanup_efficiency(
                vec![
                    d('-', "ab"),
                    d('+', "12"),
                    d('=', "xy"),
                    d('+', "34"),
                    d('=', "z"),
                    d('-', "cd"),
                    d('+', "56"),
                ],
                DEFAULT_EDIT_COST
            ),
            vec![d('-', "abxyzcd"), d('+', "12xy34z56")]
        );
    }

    #[test]
    fn test_efficiency_high_cost_elimination() {
        assert_eq!(
            cleanup_efficiency(
                vec![d('-', "ab"), d('+', "12"), d('=', "wxyz"), d('-', "cd"), d('+', "34")],
                5
            ),
            vec![d('-', "abwxyzcd"), d('+', "12wxyz34")]
        );
    }

    #[test]
    fn test_efficiency_collapses_wedged_equality() {
        let diffs = vec![d('+', "A"), d('-', "B"), d('=', "xy"), d('+', "C"), d('-', "D")];
        let cleaned = cleanup_efficiency(diffs.clone(), DEFAULT_EDIT_COST);
        assert_eq!(cleaned, vec![d('-', "BxyD"), d('+', "AxyC")]);
        assert!(cleaned.len() < crate::cleanup_semantic(diffs).len());
    }

    #[test]
    fn test_efficiency_counts_chars() {
        // three chars, twelve bytes
        let diffs = vec![d('-', "ab"), d('+', "12"), d('=', "😀😀😀"), d('-', "cd"), d('+', "34")];
        assert_eq!(
            cleanup_efficiency(diffs, DEFAULT_EDIT_COST),
            vec![d('-', "ab😀😀😀cd"), d('+', "12😀😀😀34")]
        );
    }
}
