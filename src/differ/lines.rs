use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use super::Differ;
use crate::cleanup::cleanup_semantic;
use crate::{DiffOperation, TextDiffer};

/// Number of distinct lines that can be encoded as one char each (the
/// surrogate range is skipped)
const MAX_ENCODED_LINES: usize = 0x11_0000 - 0x800;
/// Cap for the old text so the new text still has room for its own lines
const MAX_OLD_LINES: usize = MAX_ENCODED_LINES * 2 / 3;

/// Both texts rewritten so that every distinct line is a single char
pub(crate) struct LineEncoding<'a> {
    pub chars1: String,
    pub chars2: String,
    pub lines: Vec<&'a str>,
}

/// Encode each line (including its trailing `\n`) of both texts as one char
pub(crate) fn lines_to_chars<'a>(text1: &'a str, text2: &'a str) -> LineEncoding<'a> {
    let mut lines = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let chars1 = encode_lines(text1, &mut lines, &mut index, MAX_OLD_LINES);
    let chars2 = encode_lines(text2, &mut lines, &mut index, MAX_ENCODED_LINES);
    LineEncoding {
        chars1,
        chars2,
        lines,
    }
}

fn encode_lines<'a>(
    text: &'a str,
    lines: &mut Vec<&'a str>,
    index: &mut HashMap<&'a str, usize>,
    max_lines: usize,
) -> String {
    let mut encoded = String::new();
    let mut start = 0;
    while start < text.len() {
        let end = if lines.len() + 1 >= max_lines {
            // one id left: the rest of the text becomes the last line
            text.len()
        } else {
            text[start..]
                .find('\n')
                .map_or(text.len(), |pos| start + pos + 1)
        };
        let line = &text[start..end];
        let id = *index.entry(line).or_insert_with(|| {
            lines.push(line);
            lines.len() - 1
        });
        encoded.push(encode_index(id));
        start = end;
    }
    encoded
}

/// Turn encoded line chars in a diff back into the lines they stand for
pub(crate) fn chars_to_lines(diffs: Vec<TextDiffer>, lines: &[&str]) -> Vec<TextDiffer> {
    diffs
        .into_iter()
        .map(|diff| TextDiffer {
            operation: diff.operation,
            text: diff
                .text
                .chars()
                .filter_map(|c| lines.get(decode_char(c)).copied())
                .collect(),
        })
        .collect()
}

fn encode_index(i: usize) -> char {
    let code = if i < 0xD800 { i } else { i + 0x800 };
    char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn decode_char(c: char) -> usize {
    let code = c as usize;
    if code < 0xD800 {
        code
    } else {
        code - 0x800
    }
}

impl Differ {
    /// Quick line-level diff, then a char-level diff of every replaced block
    pub(crate) fn line_mode(
        &self,
        old: &str,
        new: &str,
        deadline: Option<Instant>,
    ) -> Vec<TextDiffer> {
        let encoding = lines_to_chars(old, new);
        debug!(lines = encoding.lines.len(), "diffing in line mode");

        let diffs = self.diff_main(&encoding.chars1, &encoding.chars2, false, deadline);
        let diffs = chars_to_lines(diffs, &encoding.lines);
        // drop coincidental matches like blank lines
        let diffs = cleanup_semantic(diffs);

        let mut out = Vec::with_capacity(diffs.len());
        let mut pending: Vec<TextDiffer> = Vec::new();
        for diff in diffs {
            if diff.operation == DiffOperation::Equal {
                self.rediff_block(&mut out, &mut pending, deadline);
                out.push(diff);
            } else {
                pending.push(diff);
            }
        }
        self.rediff_block(&mut out, &mut pending, deadline);
        out
    }

    /// A block holding both deletions and insertions is diffed again char by
    /// char; anything else is kept as is.
    fn rediff_block(
        &self,
        out: &mut Vec<TextDiffer>,
        pending: &mut Vec<TextDiffer>,
        deadline: Option<Instant>,
    ) {
        let mut text_delete = String::new();
        let mut text_insert = String::new();
        for diff in pending.iter() {
            match diff.operation {
                DiffOperation::Delete => text_delete.push_str(&diff.text),
                DiffOperation::Insert => text_insert.push_str(&diff.text),
                DiffOperation::Equal => {}
            }
        }

        if !text_delete.is_empty() && !text_insert.is_empty() {
            out.extend(self.diff_main(&text_delete, &text_insert, false, deadline));
            pending.clear();
        } else {
            out.append(pending);
        }
    }
}
