use std::fmt;

/// The kind of edit a [`TextDiffer`] span describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffOperation {
    Delete,
    Insert,
    Equal,
}

impl DiffOperation {
    /// The one-character code used by the delta format
    pub fn to_char(self) -> char {
        match self {
            DiffOperation::Delete => '-',
            DiffOperation::Insert => '+',
            DiffOperation::Equal => '=',
        }
    }

    /// Inverse of [`DiffOperation::to_char`]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(DiffOperation::Delete),
            '+' => Some(DiffOperation::Insert),
            '=' => Some(DiffOperation::Equal),
            _ => None,
        }
    }

    /// Returns true for Delete and Insert
    pub fn is_edit(self) -> bool {
        self != DiffOperation::Equal
    }
}

/// A single span of text tagged with the operation that produced it.
///
/// A diff sequence `diffs` is valid for `(text1, text2)` when the
/// non-Insert spans concatenate to `text1` and the non-Delete spans
/// concatenate to `text2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextDiffer {
    pub operation: DiffOperation,
    pub text: String,
}

impl TextDiffer {
    /// The canonical no-op span
    pub const EMPTY: TextDiffer = TextDiffer {
        operation: DiffOperation::Equal,
        text: String::new(),
    };

    pub fn new(operation: DiffOperation, text: impl Into<String>) -> Self {
        Self {
            operation,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(DiffOperation::Delete, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(DiffOperation::Insert, text)
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(DiffOperation::Equal, text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length of the span in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl Default for TextDiffer {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for TextDiffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.operation.to_char(), self.text)
    }
}

/// Rebuild the source text (every span that is not an Insert)
pub fn text1(diffs: &[TextDiffer]) -> String {
    diffs
        .iter()
        .filter(|d| d.operation != DiffOperation::Insert)
        .map(|d| d.text.as_str())
        .collect()
}

/// Rebuild the destination text (every span that is not a Delete)
pub fn text2(diffs: &[TextDiffer]) -> String {
    diffs
        .iter()
        .filter(|d| d.operation != DiffOperation::Delete)
        .map(|d| d.text.as_str())
        .collect()
}

/// Render a diff sequence as inline markup: `[-removed-]{+added+}`
pub fn render_inline(diffs: &[TextDiffer]) -> String {
    let mut out = String::new();
    for diff in diffs {
        match diff.operation {
            DiffOperation::Equal => out.push_str(&diff.text),
            DiffOperation::Delete => {
                out.push_str("[-");
                out.push_str(&diff.text);
                out.push_str("-]");
            }
            DiffOperation::Insert => {
                out.push_str("{+");
                out.push_str(&diff.text);
                out.push_str("+}");
            }
        }
    }
    out
}
