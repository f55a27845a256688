use std::time::Instant;

use similar::{Algorithm as SimilarAlgorithm, ChangeTag, TextDiff};

use super::Bisect;
use crate::{DiffOperation, TextDiffer};

/// Char-level bisection delegated to the `similar` crate's Myers implementation
pub(crate) struct SimilarDiffer;

impl Bisect for SimilarDiffer {
    fn bisect(&self, old: &str, new: &str, deadline: Option<Instant>) -> Vec<TextDiffer> {
        let mut config = TextDiff::configure();
        config.algorithm(SimilarAlgorithm::Myers);
        if let Some(deadline) = deadline {
            config.deadline(deadline);
        }
        let diff = config.diff_chars(old, new);

        let mut diffs: Vec<TextDiffer> = Vec::new();
        for change in diff.iter_all_changes() {
            let operation = match change.tag() {
                ChangeTag::Equal => DiffOperation::Equal,
                ChangeTag::Delete => DiffOperation::Delete,
                ChangeTag::Insert => DiffOperation::Insert,
            };
            match diffs.last_mut() {
                Some(last) if last.operation == operation => last.text.push_str(change.value()),
                _ => diffs.push(TextDiffer::new(operation, change.value())),
            }
        }
        diffs
    }
}
