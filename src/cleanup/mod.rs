//! Rewrite passes that turn a raw diff into something smaller or easier to read.
//!
//! Every pass takes a diff sequence by value and returns a new one that
//! reconstructs the same pair of texts.

mod efficiency;
mod lossless;
mod merge;
mod semantic;

pub use efficiency::cleanup_efficiency;
pub use lossless::cleanup_semantic_lossless;
pub use merge::cleanup_merge;
pub use semantic::cleanup_semantic;

use crate::TextDiffer;

/// Working cell for the passes that rewrite equalities into edits while
/// walking back and forth over the sequence.
///
/// Turning an equality into a Delete+Insert pair in place would shift every
/// index after it; marking the slot instead keeps the recorded positions valid
/// until the final [`compact`].
enum Slot {
    Kept(TextDiffer),
    /// An equality that will be emitted as a Delete and an Insert of its text
    Split(String),
}

impl Slot {
    /// Turn the kept equality at this slot into a split one
    fn split(&mut self) {
        if let Slot::Kept(diff) = self {
            let text = std::mem::take(&mut diff.text);
            *self = Slot::Split(text);
        }
    }
}

fn compact(slots: Vec<Slot>) -> Vec<TextDiffer> {
    let mut diffs = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Kept(diff) => diffs.push(diff),
            Slot::Split(text) => {
                diffs.push(TextDiffer::delete(text.clone()));
                diffs.push(TextDiffer::insert(text));
            }
        }
    }
    diffs
}
