use tracing::trace;

use super::{cleanup_merge, cleanup_semantic_lossless, compact, Slot};
use crate::differ::common_overlap;
use crate::{DiffOperation, TextDiffer};

/// Reduce the number of edits by eliminating semantically trivial equalities.
///
/// An equality no longer than the edits on both of its sides is folded into
/// them, edits are then aligned on natural boundaries, and finally text that
/// a deletion and an adjacent insertion overlap on is pulled out as an
/// equality.
pub fn cleanup_semantic(diffs: Vec<TextDiffer>) -> Vec<TextDiffer> {
    let (diffs, changed) = eliminate_noise(diffs);
    let diffs = if changed { cleanup_merge(diffs) } else { diffs };
    let diffs = cleanup_semantic_lossless(diffs);
    extract_overlaps(diffs)
}

/// Chars inserted and deleted on one side of an equality
#[derive(Debug, Default, Clone, Copy)]
struct EditLengths {
    insertions: usize,
    deletions: usize,
}

impl EditLengths {
    fn add(&mut self, operation: DiffOperation, len: usize) {
        match operation {
            DiffOperation::Insert => self.insertions += len,
            DiffOperation::Delete => self.deletions += len,
            DiffOperation::Equal => {}
        }
    }

    fn max(&self) -> usize {
        self.insertions.max(self.deletions)
    }
}

fn eliminate_noise(diffs: Vec<TextDiffer>) -> (Vec<TextDiffer>, bool) {
    let mut slots: Vec<Slot> = diffs.into_iter().map(Slot::Kept).collect();
    // indices of the equalities seen so far
    let mut equalities: Vec<usize> = Vec::new();
    // char length of the most recent candidate equality
    let mut last_equality: Option<usize> = None;
    let mut before = EditLengths::default();
    let mut after = EditLengths::default();
    let mut changed = false;
    let mut pointer = 0;

    while pointer < slots.len() {
        let edits = match &slots[pointer] {
            Slot::Kept(diff) if diff.operation == DiffOperation::Equal => {
                equalities.push(pointer);
                before = after;
                after = EditLengths::default();
                last_equality = Some(diff.char_len());
                pointer += 1;
                continue;
            }
            Slot::Kept(diff) => vec![(diff.operation, diff.char_len())],
            Slot::Split(text) => {
                let len = text.chars().count();
                vec![(DiffOperation::Delete, len), (DiffOperation::Insert, len)]
            }
        };

        let mut restart = None;
        for (operation, len) in edits {
            after.add(operation, len);
            let Some(equality_len) = last_equality else {
                continue;
            };
            if equality_len <= before.max() && equality_len <= after.max() {
                // the equality we just drowned out
                if let Some(index) = equalities.pop() {
                    slots[index].split();
                }
                // the one before it needs to be reevaluated
                equalities.pop();
                restart = Some(equalities.last().map_or(0, |&index| index + 1));
                before = EditLengths::default();
                after = EditLengths::default();
                last_equality = None;
                changed = true;
                break;
            }
        }
        pointer = restart.unwrap_or(pointer + 1);
    }

    trace!(changed, "eliminated noise equalities");
    (compact(slots), changed)
}

/// Find overlaps between adjacent deletions and insertions and pull them out
/// as equalities, when the overlap is at least half of the shorter edit:
/// `<del>abcxxx</del><ins>xxxdef</ins>` becomes
/// `<del>abc</del>xxx<ins>def</ins>` and `<del>xxxabc</del><ins>defxxx</ins>`
/// becomes `<ins>def</ins>xxx<del>abc</del>`.
fn extract_overlaps(diffs: Vec<TextDiffer>) -> Vec<TextDiffer> {
    let mut out: Vec<TextDiffer> = Vec::with_capacity(diffs.len());
    // a deletion produced by a split is never paired again
    let mut fresh = true;

    for diff in diffs {
        let pair = fresh
            && diff.operation == DiffOperation::Insert
            && matches!(out.last(), Some(d) if d.operation == DiffOperation::Delete);
        fresh = true;
        if !pair {
            out.push(diff);
            continue;
        }
        let Some(deletion) = out.pop() else {
            out.push(diff);
            continue;
        };
        let deletion = deletion.text;
        let insertion = diff.text;

        let overlap1 = common_overlap(&deletion, &insertion);
        let overlap2 = common_overlap(&insertion, &deletion);
        let deletion_len = deletion.chars().count();
        let insertion_len = insertion.chars().count();
        let shorter = deletion_len.min(insertion_len);

        if overlap1 >= overlap2 {
            let overlap_len = insertion[..overlap1].chars().count();
            if overlap1 > 0 && overlap_len * 2 >= shorter {
                push_non_empty(&mut out, TextDiffer::delete(&deletion[..deletion.len() - overlap1]));
                out.push(TextDiffer::equal(&insertion[..overlap1]));
                push_non_empty(&mut out, TextDiffer::insert(&insertion[overlap1..]));
                continue;
            }
        } else {
            let overlap_len = deletion[..overlap2].chars().count();
            if overlap_len * 2 >= shorter {
                push_non_empty(&mut out, TextDiffer::insert(&insertion[..insertion.len() - overlap2]));
                out.push(TextDiffer::equal(&deletion[..overlap2]));
                push_non_empty(&mut out, TextDiffer::delete(&deletion[overlap2..]));
                fresh = false;
                continue;
            }
        }

        out.push(TextDiffer::delete(deletion));
        out.push(TextDiffer::insert(insertion));
    }

    out
}

fn push_non_empty(out: &mut Vec<TextDiffer>, diff: TextDiffer) {
    if !diff.is_empty() {
        out.push(diff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(op: char, text: &str) -> TextDiffer {
        TextDiffer::new(DiffOperation::from_char(op).unwrap(), text)
    }

    #[test]
    fn test_semantic_empty() {
        assert_eq!(cleanup_semantic(vec![]), vec![]);
    }

    #[test]
    fn test_semantic_no_elimination() {
        let diffs = vec![d('-', "ab"), d('+', "cd"), d('=', "12"), d('-', "e")];
        assert_eq!(cleanup_semantic(diffs.clone()), diffs);

        let diffs = vec![d('-', "abc"), d('+', "ABC"), d('=', "1234"), d('-', "wxyz")];
        assert_eq!(cleanup_semantic(diffs.clone()), diffs);
    }

    #[test]
    fn test_semantic_simple_elimination() {
        assert_eq!(
            cleanup_semantic(vec![d('-', "a"), d('=', "b"), d('-', "c")]),
            vec![d('-', "abc"), d('+', "b")]
        );
    }

    #[test]
    fn test_semantic_backpass_elimination() {
        assert_eq!(
            cleanup_semantic(vec![
                d('-', "ab"),
                d('=', "cd"),
                d('-', "e"),
                d('=', "f"),
                d('+', "g"),
            ]),
            vec![d('-', "abcdef"), d('+', "cdfg")]
        );
    }

    #[test]
    fn test_semantic_multiple_eliminations() {
        assert_eq!(
            cleanup_semantic(vec![
                d('+', "1"),
                d('=', "A"),
                d('-', "B"),
                d('+', "2"),
                d('=', "_"),
                d('+', "1"),
                d('=', "A"),
                d('-', "B"),
                d('+', "2"),
            ]),
            vec![d('-', "AB_AB"), d('+', "1A2_1A2")]
        );
    }

    #[test]
    fn test_semantic_word_boundaries() {
        assert_eq!(
            cleanup_semantic(vec![d('=', "The c"), d('-', "ow and the c"), d('=', "at.")]),
            vec![d('=', "The "), d('-', "cow and the "), d('=', "cat.")]
        );
    }

    #[test]
    fn test_semantic_overlaps() {
        // too small to extract
        let diffs = vec![d('-', "abcxx"), d('+', "xxdef")];
        assert_eq!(cleanup_semantic(diffs.clone()), diffs);

        assert_eq!(
            cleanup_semantic(vec![d('-', "abcxxx"), d('+', "xxxdef")]),
            vec![d('-', "abc"), d('=', "xxx"), d('+', "def")]
        );
        assert_eq!(
            cleanup_semantic(vec![d('-', "xxxabc"), d('+', "defxxx")]),
            vec![d('+', "def"), d('=', "xxx"), d('-', "abc")]
        );
        assert_eq!(
            cleanup_semantic(vec![
                d('-', "abcd1212"),
                d('+', "1212efghi"),
                d('=', "----"),
                d('-', "A3"),
                d('+', "3BC"),
            ]),
            vec![
                d('-', "abcd"),
                d('=', "1212"),
                d('+', "efghi"),
                d('=', "----"),
                d('-', "A"),
                d('=', "3"),
                d('+', "BC"),
            ]
        );
    }

    #[test]
    fn test_semantic_reverse_overlap_remainder_not_repaired() {
        // unmerged input: the deletion left over by the first split is not
        // matched against the insertion that follows it
        assert_eq!(
            cleanup_semantic(vec![d('-', "xxxabc"), d('+', "defxxx"), d('+', "abcq")]),
            vec![d('+', "def"), d('=', "xxx"), d('-', "abc"), d('+', "abcq")]
        );
    }

    #[test]
    fn test_semantic_mouse_sofas() {
        let diffs = vec![
            d('-', "m"),
            d('+', "s"),
            d('=', "o"),
            d('-', "u"),
            d('+', "fa"),
            d('=', "s"),
            d('-', "e"),
        ];
        assert_eq!(
            cleanup_semantic(diffs),
            vec![d('-', "mouse"), d('+', "sofas")]
        );
    }
}
