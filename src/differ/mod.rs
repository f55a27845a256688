mod common;
mod half_match;
mod lines;
mod myers;
mod similar;

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cleanup::{cleanup_efficiency, cleanup_merge, cleanup_semantic, cleanup_semantic_lossless};
use crate::{DiffOperation, TextDiffer};

pub use common::{common_overlap, common_prefix, common_suffix};
pub use half_match::{half_match, HalfMatchResult};
pub(crate) use myers::MyersDiffer;
pub(crate) use similar::SimilarDiffer;

pub(crate) use common::char_offset;

/// Cost of an empty edit operation in terms of edit characters
pub const DEFAULT_EDIT_COST: usize = 4;

/// How long a diff may run before it settles for a coarser result
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Texts with more chars than this on both sides are diffed line by line first
const LINE_MODE_THRESHOLD: usize = 100;

/// Trait for different diffing algorithms
pub trait DiffAlgorithm {
    /// Generate the diff sequence between the old and new content
    fn generate(&self) -> Vec<TextDiffer>;
}

/// The primitive that finds a minimal edit script between two texts that share
/// no common prefix or suffix
pub(crate) trait Bisect {
    fn bisect(&self, old: &str, new: &str, deadline: Option<Instant>) -> Vec<TextDiffer>;
}

/// Enum to specify which bisection primitive to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffAlgorithmType {
    #[default]
    Myers,
    Similar,
}

/// The rewrite applied to the raw diff once it is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cleanup {
    /// Keep the merged raw diff
    #[default]
    None,
    /// Human readable: drop noise equalities, align to word boundaries
    Semantic,
    /// Only slide edits onto better boundaries, never change what is edited
    SemanticLossless,
    /// Machine friendly: fewer hunks at the cost of larger edits
    Efficiency { edit_cost: usize },
}

/// The base Differ struct that orchestrates the diffing process
pub struct Differ {
    pub(crate) algorithm: DiffAlgorithmType,
    pub(crate) old: String,
    pub(crate) new: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) check_lines: bool,
    pub(crate) cleanup: Cleanup,
}

impl Differ {
    /// Create a new Differ with the old and new content using the default algorithm (Myers).
    pub fn new(old: &str, new: &str) -> Self {
        Self::new_with_algorithm(old, new, DiffAlgorithmType::Myers)
    }

    /// Create a new Differ with the old and new content and a specified algorithm.
    pub fn new_with_algorithm(old: &str, new: &str, algorithm: DiffAlgorithmType) -> Self {
        Self {
            algorithm,
            old: old.to_string(),
            new: new.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            check_lines: true,
            cleanup: Cleanup::None,
        }
    }

    /// Set the time budget; `None` computes a minimal diff however long it takes.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the line-level pre-pass for long texts.
    pub fn check_lines(mut self, check_lines: bool) -> Self {
        self.check_lines = check_lines;
        self
    }

    /// Set the cleanup pass applied to the generated diff.
    pub fn cleanup(mut self, cleanup: Cleanup) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Diff two texts: trim what they share at both ends, diff the middle, merge.
    pub(crate) fn diff_main(
        &self,
        old: &str,
        new: &str,
        check_lines: bool,
        deadline: Option<Instant>,
    ) -> Vec<TextDiffer> {
        if old == new {
            return if old.is_empty() {
                Vec::new()
            } else {
                vec![TextDiffer::equal(old)]
            };
        }

        let prefix_len = common_prefix(old, new);
        let (prefix, old, new) = (&old[..prefix_len], &old[prefix_len..], &new[prefix_len..]);
        let suffix_len = common_suffix(old, new);
        let suffix = &old[old.len() - suffix_len..];
        let old = &old[..old.len() - suffix_len];
        let new = &new[..new.len() - suffix_len];

        let mut diffs = Vec::new();
        if !prefix.is_empty() {
            diffs.push(TextDiffer::equal(prefix));
        }
        diffs.extend(self.compute(old, new, check_lines, deadline));
        if !suffix.is_empty() {
            diffs.push(TextDiffer::equal(suffix));
        }
        cleanup_merge(diffs)
    }

    /// Diff two texts known to share no common prefix or suffix
    fn compute(
        &self,
        old: &str,
        new: &str,
        check_lines: bool,
        deadline: Option<Instant>,
    ) -> Vec<TextDiffer> {
        if old.is_empty() {
            return vec![TextDiffer::insert(new)];
        }
        if new.is_empty() {
            return vec![TextDiffer::delete(old)];
        }

        let old_len = old.chars().count();
        let new_len = new.chars().count();
        let (long, short, edit) = if old_len > new_len {
            (old, new, DiffOperation::Delete)
        } else {
            (new, old, DiffOperation::Insert)
        };

        if let Some(i) = long.find(short) {
            // the shorter text sits inside the longer one
            return [
                TextDiffer::new(edit, &long[..i]),
                TextDiffer::equal(short),
                TextDiffer::new(edit, &long[i + short.len()..]),
            ]
            .into_iter()
            .filter(|d| !d.is_empty())
            .collect();
        }

        if old_len.min(new_len) == 1 {
            // a single char that is not contained in the other text
            return vec![TextDiffer::delete(old), TextDiffer::insert(new)];
        }

        // Splitting on a half match can give a non-minimal diff, so only do it on a budget
        if deadline.is_some() {
            let hm = half_match(old, new);
            if !hm.is_empty() {
                trace!(common = hm.common_middle.len(), "splitting on half match");
                let mut diffs = self.diff_main(&hm.prefix1, &hm.prefix2, check_lines, deadline);
                diffs.push(TextDiffer::equal(hm.common_middle));
                diffs.extend(self.diff_main(&hm.suffix1, &hm.suffix2, check_lines, deadline));
                return diffs;
            }
        }

        if check_lines && old_len > LINE_MODE_THRESHOLD && new_len > LINE_MODE_THRESHOLD {
            return self.line_mode(old, new, deadline);
        }

        match self.algorithm {
            DiffAlgorithmType::Myers => MyersDiffer::new(self).bisect(old, new, deadline),
            DiffAlgorithmType::Similar => SimilarDiffer.bisect(old, new, deadline),
        }
    }
}

impl DiffAlgorithm for Differ {
    fn generate(&self) -> Vec<TextDiffer> {
        let deadline = self
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        let diffs = self.diff_main(&self.old, &self.new, self.check_lines, deadline);
        debug!(
            algorithm = ?self.algorithm,
            cleanup = ?self.cleanup,
            raw = diffs.len(),
            "generated raw diff"
        );

        match self.cleanup {
            Cleanup::None => diffs,
            Cleanup::Semantic => cleanup_semantic(diffs),
            Cleanup::SemanticLossless => cleanup_semantic_lossless(diffs),
            Cleanup::Efficiency { edit_cost } => cleanup_efficiency(diffs, edit_cost),
        }
    }
}
