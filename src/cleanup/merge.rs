use tracing::trace;

use crate::differ::{common_prefix, common_suffix};
use crate::{DiffOperation, TextDiffer};

/// Merge adjacent edits of the same kind, fold text shared by a deletion and
/// an insertion into the surrounding equalities, and slide lone edits sitting
/// between two equalities until nothing moves any more.
pub fn cleanup_merge(mut diffs: Vec<TextDiffer>) -> Vec<TextDiffer> {
    let mut rounds = 1;
    loop {
        let (shifted, changed) = shift_single_edits(merge_runs(diffs));
        diffs = shifted;
        if !changed {
            break;
        }
        rounds += 1;
    }
    trace!(rounds, len = diffs.len(), "cleanup_merge");
    diffs
}

/// Collapse every run of edits into at most one Delete and one Insert,
/// factoring their common prefix and suffix out into equalities.
fn merge_runs(diffs: Vec<TextDiffer>) -> Vec<TextDiffer> {
    let mut out: Vec<TextDiffer> = Vec::with_capacity(diffs.len());
    let mut text_delete = String::new();
    let mut text_insert = String::new();

    for diff in diffs {
        if diff.text.is_empty() {
            continue;
        }
        match diff.operation {
            DiffOperation::Delete => text_delete.push_str(&diff.text),
            DiffOperation::Insert => text_insert.push_str(&diff.text),
            DiffOperation::Equal => {
                let equality = flush_edits(&mut out, &mut text_delete, &mut text_insert, diff.text);
                push_equal(&mut out, equality);
            }
        }
    }
    let tail = flush_edits(&mut out, &mut text_delete, &mut text_insert, String::new());
    push_equal(&mut out, tail);
    out
}

/// Emit the buffered run and return the equality that follows it, which may
/// have grown by the run's common suffix.
fn flush_edits(
    out: &mut Vec<TextDiffer>,
    text_delete: &mut String,
    text_insert: &mut String,
    mut following: String,
) -> String {
    let mut delete = std::mem::take(text_delete);
    let mut insert = std::mem::take(text_insert);

    if !delete.is_empty() && !insert.is_empty() {
        let prefix_len = common_prefix(&insert, &delete);
        if prefix_len > 0 {
            push_equal(out, insert[..prefix_len].to_string());
            insert.drain(..prefix_len);
            delete.drain(..prefix_len);
        }

        let suffix_len = common_suffix(&insert, &delete);
        if suffix_len > 0 {
            following.insert_str(0, &insert[insert.len() - suffix_len..]);
            insert.truncate(insert.len() - suffix_len);
            delete.truncate(delete.len() - suffix_len);
        }
    }

    if !delete.is_empty() {
        out.push(TextDiffer::delete(delete));
    }
    if !insert.is_empty() {
        out.push(TextDiffer::insert(insert));
    }
    following
}

/// Append an equality, growing the previous one if it is also an equality
fn push_equal(out: &mut Vec<TextDiffer>, text: String) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.operation == DiffOperation::Equal => last.text.push_str(&text),
        _ => out.push(TextDiffer::equal(text)),
    }
}

enum Shift {
    Left,
    Right,
    Stay,
}

/// Look for single edits surrounded by equalities which can be shifted
/// sideways to eliminate one of the equalities, e.g. `A<ba>C -> <ab>aC`.
///
/// Expects the output of [`merge_runs`]: no empty spans, no adjacent equalities.
fn shift_single_edits(diffs: Vec<TextDiffer>) -> (Vec<TextDiffer>, bool) {
    let mut out: Vec<TextDiffer> = Vec::with_capacity(diffs.len());
    let mut changed = false;
    let mut iter = diffs.into_iter().peekable();

    while let Some(mut current) = iter.next() {
        let shift = match (out.last(), iter.peek()) {
            (Some(previous), Some(next))
                if current.operation.is_edit()
                    && previous.operation == DiffOperation::Equal
                    && next.operation == DiffOperation::Equal =>
            {
                if current.text.ends_with(previous.text.as_str()) {
                    Shift::Left
                } else if current.text.starts_with(next.text.as_str()) {
                    Shift::Right
                } else {
                    Shift::Stay
                }
            }
            _ => Shift::Stay,
        };

        match shift {
            Shift::Left => {
                if let (Some(previous), Some(mut next)) = (out.pop(), iter.next()) {
                    let kept = current.text.len() - previous.text.len();
                    current.text = format!("{}{}", previous.text, &current.text[..kept]);
                    next.text.insert_str(0, &previous.text);
                    out.push(current);
                    out.push(next);
                    changed = true;
                }
            }
            Shift::Right => {
                if let (Some(previous), Some(next)) = (out.last_mut(), iter.next()) {
                    previous.text.push_str(&next.text);
                    current.text = format!("{}{}", &current.text[next.text.len()..], next.text);
                    out.push(current);
                    changed = true;
                }
            }
            Shift::Stay => out.push(current),
        }
    }

    (out, changed)
}
