//! Compact text encoding of a diff: `=3\t-2\t+ing` reads as "keep 3 chars,
//! drop 2 chars, insert `ing`".
//!
//! Equalities and deletions carry only their length in chars, so decoding
//! needs the old text the diff was made against.

use tracing::debug;

use crate::differ::char_offset;
use crate::{DiffOperation, Error, TextDiffer};

/// Encode a diff sequence as tab separated tokens.
///
/// Inserted text is percent-encoded so that it never contains a tab; all
/// other spans become their length.
pub fn to_delta(diffs: &[TextDiffer]) -> String {
    let tokens: Vec<String> = diffs
        .iter()
        .map(|diff| match diff.operation {
            DiffOperation::Insert => format!("+{}", percent_encode(&diff.text)),
            op => format!("{}{}", op.to_char(), diff.char_len()),
        })
        .collect();
    tokens.join("\t")
}

/// Rebuild the diff sequence that [`to_delta`] encoded, taking the text of
/// equalities and deletions from `text1`.
///
/// Empty tokens are skipped, as are spans that decode to no text. The delta
/// must consume `text1` exactly.
pub fn from_delta(text1: &str, delta: &str) -> Result<Vec<TextDiffer>, Error> {
    let mut diffs = Vec::new();
    // char position and byte offset in text1
    let mut pointer = 0;
    let mut offset = 0;

    for token in delta.split('\t').filter(|token| !token.is_empty()) {
        let mut chars = token.chars();
        let Some(tag) = chars.next() else {
            continue;
        };
        let param = chars.as_str();

        match DiffOperation::from_char(tag) {
            Some(DiffOperation::Insert) => {
                let text = percent_decode(param).ok_or_else(|| {
                    debug!(token, "bad escape in delta");
                    Error::InvalidEscape {
                        token: token.to_string(),
                    }
                })?;
                if !text.is_empty() {
                    diffs.push(TextDiffer::insert(text));
                }
            }
            Some(operation) => {
                let n: usize = param.parse().map_err(|source| Error::InvalidNumber {
                    token: token.to_string(),
                    source,
                })?;
                let rest = &text1[offset..];
                let Some(len) = char_offset(rest, n) else {
                    let remaining = rest.chars().count();
                    debug!(requested = n, remaining, position = pointer, "delta overruns text");
                    return Err(Error::DeltaOverrun {
                        requested: n,
                        remaining,
                        position: pointer,
                    });
                };
                if len > 0 {
                    diffs.push(TextDiffer::new(operation, &rest[..len]));
                }
                pointer += n;
                offset += len;
            }
            None => {
                return Err(Error::InvalidOperation {
                    op: tag,
                    token: token.to_string(),
                })
            }
        }
    }

    if offset != text1.len() {
        let expected = pointer + text1[offset..].chars().count();
        debug!(consumed = pointer, expected, "delta stops short of text");
        return Err(Error::DeltaShortfall {
            consumed: pointer,
            expected,
        });
    }
    Ok(diffs)
}

/// Escape every char outside the URI-safe set as `%XX` over its UTF-8 bytes
fn percent_encode(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => result.push(c),
            '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')' => result.push(c),
            ';' | '/' | '?' | ':' | '@' | '&' | '=' | '$' | ',' | '#' | ' ' => result.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    result
}

/// Undo [`percent_encode`]. `None` on a truncated or non-hex escape, or when
/// the escaped bytes are not UTF-8.
fn percent_decode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{text1, text2};

    #[test]
    fn test_to_delta_escapes_percent() {
        let diffs = vec![
            TextDiffer::equal("abc"),
            TextDiffer::delete("xyz"),
            TextDiffer::insert("1%2"),
        ];
        let delta = to_delta(&diffs);
        assert_eq!(delta, "=3\t-3\t+1%252");
        assert_eq!(from_delta("abcxyz", &delta).unwrap(), diffs);
    }

    #[test]
    fn test_delta_round_trip() {
        let diffs = vec![
            TextDiffer::equal("jump"),
            TextDiffer::delete("s"),
            TextDiffer::insert("ed"),
            TextDiffer::equal(" over "),
            TextDiffer::delete("the"),
            TextDiffer::insert("a"),
            TextDiffer::equal(" lazy"),
            TextDiffer::insert("old dog"),
        ];
        let old = text1(&diffs);
        assert_eq!(old, "jumps over the lazy");

        let delta = to_delta(&diffs);
        assert_eq!(delta, "=4\t-1\t+ed\t=6\t-3\t+a\t=5\t+old dog");
        assert_eq!(from_delta(&old, &delta).unwrap(), diffs);
    }

    #[test]
    fn test_delta_unicode() {
        let diffs = vec![
            TextDiffer::equal("\u{0680} \x00 \t %"),
            TextDiffer::delete("\u{0681} \x01 \n ^"),
            TextDiffer::insert("\u{0682} \x02 \\ |"),
        ];
        let old = text1(&diffs);
        let delta = to_delta(&diffs);
        assert_eq!(delta, "=7\t-7\t+%DA%82 %02 %5C %7C");
        assert_eq!(from_delta(&old, &delta).unwrap(), diffs);
    }

    #[test]
    fn test_delta_unchanged_chars() {
        let text = "A-Z a-z 0-9 - _ . ! ~ * ' ( ) ; / ? : @ & = + $ , # ";
        let diffs = vec![TextDiffer::insert(text)];
        let delta = to_delta(&diffs);
        assert_eq!(
            delta,
            "+A-Z a-z 0-9 - _ . ! ~ * ' ( ) ; / ? : @ & = %2B $ , # "
        );
        assert_eq!(from_delta("", &delta).unwrap(), diffs);
    }

    #[test]
    fn test_delta_decodes_lowercase_and_literal_plus() {
        assert_eq!(
            from_delta("", "+a+b%c3%a9").unwrap(),
            vec![TextDiffer::insert("a+bé")]
        );
    }

    #[test]
    fn test_delta_lengths_count_chars() {
        let diffs = vec![TextDiffer::equal("日本"), TextDiffer::delete("語")];
        assert_eq!(to_delta(&diffs), "=2\t-1");
        let rebuilt = from_delta("日本語", "=2\t-1").unwrap();
        assert_eq!(text1(&rebuilt), "日本語");
        assert_eq!(text2(&rebuilt), "日本");
    }

    #[test]
    fn test_delta_skips_empty_tokens() {
        assert_eq!(
            from_delta("ab", "=1\t\t\t-1\t").unwrap(),
            vec![TextDiffer::equal("a"), TextDiffer::delete("b")]
        );
        assert_eq!(from_delta("", "").unwrap(), vec![]);
    }

    #[test]
    fn test_delta_overrun() {
        let err = from_delta("hello", "=10").unwrap_err();
        assert!(matches!(
            err,
            Error::DeltaOverrun {
                requested: 10,
                remaining: 5,
                position: 0
            }
        ));
    }

    #[test]
    fn test_delta_shortfall() {
        let err = from_delta("hello world", "=5\t-1").unwrap_err();
        assert!(matches!(
            err,
            Error::DeltaShortfall {
                consumed: 6,
                expected: 11
            }
        ));
    }

    #[test]
    fn test_delta_invalid_tokens() {
        assert!(matches!(
            from_delta("abc", "=x").unwrap_err(),
            Error::InvalidNumber { .. }
        ));
        assert!(matches!(
            from_delta("abc", "--1").unwrap_err(),
            Error::InvalidNumber { .. }
        ));
        assert!(matches!(
            from_delta("abc", "*3").unwrap_err(),
            Error::InvalidOperation { op: '*', .. }
        ));
        assert!(matches!(
            from_delta("", "+%4").unwrap_err(),
            Error::InvalidEscape { .. }
        ));
        assert!(matches!(
            from_delta("", "+%zz").unwrap_err(),
            Error::InvalidEscape { .. }
        ));
        assert!(matches!(
            from_delta("", "+%C3").unwrap_err(),
            Error::InvalidEscape { .. }
        ));
    }
}
