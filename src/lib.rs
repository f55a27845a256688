use thiserror::Error;

pub mod cleanup;
mod delta;
mod diff;
pub mod differ;
mod distance;

// Re-export the building blocks for convenience
pub use cleanup::{cleanup_efficiency, cleanup_merge, cleanup_semantic, cleanup_semantic_lossless};
pub use delta::{from_delta, to_delta};
pub use diff::{render_inline, text1, text2, DiffOperation, TextDiffer};
pub use differ::{
    half_match, Cleanup, DiffAlgorithm, DiffAlgorithmType, Differ, HalfMatchResult, DEFAULT_EDIT_COST,
    DEFAULT_TIMEOUT,
};
pub use distance::{find_equivalent_location2, levenshtein};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not parse length in delta token '{token}': {source}")]
    InvalidNumber {
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Delta token at char {position} asks for {requested} chars but only {remaining} remain")]
    DeltaOverrun {
        requested: usize,
        remaining: usize,
        position: usize,
    },

    #[error("Delta consumed {consumed} chars of a {expected} char text")]
    DeltaShortfall { consumed: usize, expected: usize },

    #[error("Invalid operation '{op}' in delta token '{token}'")]
    InvalidOperation { op: char, token: String },

    #[error("Invalid percent escape in delta token '{token}'")]
    InvalidEscape { token: String },
}

#[cfg(test)]
mod tests {
    use super::{from_delta, text1, text2, to_delta, Cleanup, DiffAlgorithm, Differ, Error};

    #[test]
    fn test_integration_diff_and_delta() -> Result<(), Error> {
        let old_content = "line1
line2
line3
line4";
        let new_content = "line1
line2 modified
line3
line4";

        // Arrange: Generate a diff and encode it
        let differ = Differ::new(old_content, new_content).cleanup(Cleanup::Semantic);
        let diffs = differ.generate();
        let delta = to_delta(&diffs);

        // Act: Rebuild the diff from the old text and the delta
        let rebuilt = from_delta(old_content, &delta)?;

        // Assert: Check that the new content is reproduced
        assert_eq!(rebuilt, diffs);
        assert_eq!(text1(&rebuilt), old_content);
        assert_eq!(text2(&rebuilt), new_content);
        assert_eq!(delta, "=11\t+ modified\t=12");

        Ok(())
    }

    #[test]
    fn test_delta_error_reports_lengths() {
        let err = from_delta("hello", "=10").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Delta token at char 0 asks for 10 chars but only 5 remain"
        );
    }
}
