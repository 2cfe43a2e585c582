//! String escape decoding.
//!
//! String literals are lexed raw; the backslash escapes inside them are
//! decoded here, at evaluation time.  Recognised forms:
//!
//! - C-style single characters: `\a \b \e \f \n \r \t \v \\ \' \" \?`
//! - `\uXXXX` (exactly 4 hex digits) and `\UXXXXXXXX` (exactly 8), encoded
//!   back to UTF-8; code points Rust cannot represent (surrogates, values
//!   above 0x10FFFF) become U+FFFD
//!
//! A backslash followed by anything else passes through literally, as does
//! a lone trailing backslash.

use std::iter::Peekable;
use std::str::CharIndices;

/// Decode the escapes in an unquoted string body.
///
/// On a malformed `\u`/`\U` escape (non-hex digit or truncated), returns the
/// byte offset of the backslash within `body` so the caller can point a
/// diagnostic at it.
pub fn decode(body: &str) -> Result<String, usize> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((at, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            None => out.push('\\'),
            Some((_, esc)) => match esc {
                'a' => out.push('\x07'),
                'b' => out.push('\x08'),
                'e' => out.push('\x1b'),
                'f' => out.push('\x0c'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'v' => out.push('\x0b'),
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                '?' => out.push('?'),
                'u' => out.push(unicode_escape(&mut chars, 4).ok_or(at)?),
                'U' => out.push(unicode_escape(&mut chars, 8).ok_or(at)?),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
        }
    }
    Ok(out)
}

/// Read exactly `digits` hex digits and convert the code point to a char,
/// substituting U+FFFD for values outside the Unicode scalar range.
fn unicode_escape(chars: &mut Peekable<CharIndices<'_>>, digits: u32) -> Option<char> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let (_, c) = chars.next()?;
        value = value.wrapping_mul(16).wrapping_add(c.to_digit(16)?);
    }
    Some(char::from_u32(value).unwrap_or('\u{fffd}'))
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_text_is_identity() {
        assert_eq!(decode("hello world"), Ok("hello world".to_owned()));
        assert_eq!(decode(""), Ok(String::new()));
    }

    #[test]
    fn single_char_escapes() {
        assert_eq!(
            decode(r"\a\b\e\f\n\r\t\v"),
            Ok("\x07\x08\x1b\x0c\n\r\t\x0b".to_owned())
        );
        assert_eq!(decode(r#"\\\'\"\?"#), Ok("\\'\"?".to_owned()));
    }

    #[test]
    fn unicode_4_digit() {
        assert_eq!(decode(r"\u0041"), Ok("A".to_owned()));
        assert_eq!(decode(r"\u00e9"), Ok("é".to_owned()));
        assert_eq!(decode(r"\u2713"), Ok("✓".to_owned()));
    }

    #[test]
    fn unicode_8_digit_reaches_astral_plane() {
        assert_eq!(decode(r"\U0001F600"), Ok("😀".to_owned()));
        assert_eq!(decode(r"\U00000041"), Ok("A".to_owned()));
    }

    #[test]
    fn utf8_length_rules() {
        // 1, 2, 3, and 4 byte encodings.
        assert_eq!(decode(r"\u007f").unwrap().len(), 1);
        assert_eq!(decode(r"\u07ff").unwrap().len(), 2);
        assert_eq!(decode(r"\uffff").unwrap().len(), 3);
        assert_eq!(decode(r"\U0010ffff").unwrap().len(), 4);
    }

    #[test]
    fn out_of_range_becomes_replacement() {
        assert_eq!(decode(r"\U00110000"), Ok("\u{fffd}".to_owned()));
        assert_eq!(decode(r"\Uffffffff"), Ok("\u{fffd}".to_owned()));
        // Surrogate halves are not scalar values either.
        assert_eq!(decode(r"\ud800"), Ok("\u{fffd}".to_owned()));
    }

    #[test]
    fn bad_hex_digit_reports_backslash_offset() {
        assert_eq!(decode(r"\u00g1"), Err(0));
        assert_eq!(decode(r"ab\u12"), Err(2));
        assert_eq!(decode(r"x\U0001F60"), Err(1));
    }

    #[test]
    fn unknown_escape_passes_through() {
        assert_eq!(decode(r"\x41"), Ok("\\x41".to_owned()));
        assert_eq!(decode(r"a\zb"), Ok("a\\zb".to_owned()));
    }

    #[test]
    fn trailing_backslash_passes_through() {
        assert_eq!(decode("abc\\"), Ok("abc\\".to_owned()));
    }

    #[test]
    fn escapes_mix_with_text() {
        assert_eq!(decode(r"a\tb\u0021"), Ok("a\tb!".to_owned()));
    }
}
