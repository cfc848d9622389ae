//! Parser for the classic `.properties` text format.
//!
//! Produces entries in file order. Duplicate keys are kept; the loader's
//! last-write-wins ingestion resolves them.

use std::borrow::Cow;

use crate::error::{ConfigError, Result};

/// Parse property text into ordered `(key, value)` pairs.
pub fn parse_properties(text: &str) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for (line, logical) in logical_lines(text) {
        let (key, value) = split_key_value(&logical);
        entries.push((unescape(key, line)?, unescape(value, line)?));
    }
    Ok(entries)
}

/// Parse raw bytes: UTF-8 when valid, ISO-8859-1 otherwise.
pub fn parse_properties_bytes(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    parse_properties(&decode_text(bytes))
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        // Every byte maps to the code point of the same value in ISO-8859-1.
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn natural_lines(text: &str) -> impl Iterator<Item = &str> {
    // `lines()` already handles `\n` and `\r\n`; a lone `\r` still ends a line.
    text.lines().flat_map(|l| l.split('\r'))
}

/// Join continuation lines and drop comments and blank lines.
///
/// Yields the 1-based number of the natural line each logical line starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, raw) in natural_lines(text).enumerate() {
        let piece = raw.trim_start_matches(is_blank);

        let (start, mut buf) = match current.take() {
            Some(pending) => pending,
            None => {
                if piece.is_empty() || piece.starts_with('#') || piece.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            },
        };

        let trailing = piece.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            buf.push_str(&piece[..piece.len() - 1]);
            current = Some((start, buf));
        } else {
            buf.push_str(piece);
            out.push((start, buf));
        }
    }

    if let Some(pending) = current {
        out.push(pending);
    }
    out
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_sep = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if !escaped && (c == '=' || c == ':') {
            key_end = i;
            value_start = i + 1;
            has_sep = true;
            break;
        }
        if !escaped && is_blank(c) {
            key_end = i;
            value_start = i + 1;
            break;
        }
        escaped = c == '\\' && !escaped;
    }

    let rest = &line[value_start..];
    let mut skip = rest.len();
    for (i, c) in rest.char_indices() {
        if is_blank(c) {
            continue;
        }
        if !has_sep && (c == '=' || c == ':') {
            has_sep = true;
            continue;
        }
        skip = i;
        break;
    }

    (&line[..key_end], &rest[skip..])
}

fn unescape(raw: &str, line: usize) -> Result<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out);
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            break;
        };
        if next == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            let unit = (hex.len() == 4 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .then(|| u16::from_str_radix(&hex, 16).ok())
                .flatten()
                .ok_or_else(|| ConfigError::Parse {
                    line,
                    message: format!("malformed \\uxxxx encoding: \\u{hex}"),
                })?;
            units.push(unit);
            continue;
        }
        flush_units(&mut units, &mut out);
        out.push(match next {
            't' => '\t',
            'r' => '\r',
            'n' => '\n',
            'f' => '\x0c',
            other => other,
        });
    }
    flush_units(&mut units, &mut out);
    Ok(out)
}

/// Decode pending `\uXXXX` units, pairing surrogates.
fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    if units.is_empty() {
        return;
    }
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<(String, String)> {
        parse_properties(text).unwrap()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn separators() {
        let entries = parse("a=1\nb:2\nc 3\nd = 4\ne\t:\t5\nf==6\n");
        assert_eq!(entries, vec![
            pair("a", "1"),
            pair("b", "2"),
            pair("c", "3"),
            pair("d", "4"),
            pair("e", "5"),
            pair("f", "=6"),
        ]);
    }

    #[test]
    fn comments_and_blank_lines() {
        let entries = parse("# comment\n! also\n\n   \nkey=value\n  # indented comment\n");
        assert_eq!(entries, vec![pair("key", "value")]);
    }

    #[test]
    fn key_without_value() {
        assert_eq!(parse("lonely\nempty=\n"), vec![
            pair("lonely", ""),
            pair("empty", "")
        ]);
    }

    #[test]
    fn continuation_lines() {
        let entries = parse("fruits = apple, \\\n    banana, \\\n    pear\nnext=1");
        assert_eq!(entries, vec![
            pair("fruits", "apple, banana, pear"),
            pair("next", "1")
        ]);
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        let entries = parse("path=c:\\\\dir\\\\\nother=x");
        assert_eq!(entries, vec![pair("path", "c:\\dir\\"), pair("other", "x")]);
    }

    #[test]
    fn comment_lines_are_not_continued() {
        let entries = parse("# note \\\nkey=value");
        assert_eq!(entries, vec![pair("key", "value")]);
    }

    #[test]
    fn escaped_separators_in_key() {
        let entries = parse("a\\=b=c\nx\\ y=z\nurl\\:part=1");
        assert_eq!(entries, vec![
            pair("a=b", "c"),
            pair("x y", "z"),
            pair("url:part", "1")
        ]);
    }

    #[test]
    fn escapes_and_unicode() {
        let entries = parse("tab=a\\tb\nnl=a\\nb\nuni=caf\\u00e9\nemoji=\\uD83D\\uDE00\nother=\\q");
        assert_eq!(entries, vec![
            pair("tab", "a\tb"),
            pair("nl", "a\nb"),
            pair("uni", "café"),
            pair("emoji", "😀"),
            pair("other", "q"),
        ]);
    }

    #[test]
    fn malformed_unicode_escape_reports_line() {
        let err = parse_properties("ok=1\nbad=\\u12").unwrap_err();
        match err {
            ConfigError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unicode_escape_needs_four_hex_digits() {
        assert!(matches!(parse_properties("k=\\u+041"), Err(ConfigError::Parse { line: 1, .. })));
        assert!(matches!(parse_properties("k=\\u-041"), Err(ConfigError::Parse { .. })));
        assert!(matches!(parse_properties("k=\\u 041"), Err(ConfigError::Parse { .. })));
        assert_eq!(parse("k=\\u0041"), vec![pair("k", "A")]);
    }

    #[test]
    fn crlf_and_cr_line_endings() {
        assert_eq!(parse("a=1\r\nb=2\rc=3"), vec![
            pair("a", "1"),
            pair("b", "2"),
            pair("c", "3")
        ]);
    }

    #[test]
    fn placeholders_are_kept_verbatim() {
        assert_eq!(parse("Greeting=Hello ${Name}"), vec![pair(
            "Greeting",
            "Hello ${Name}"
        )]);
    }

    #[test]
    fn latin1_fallback() {
        let entries = parse_properties_bytes(b"name=caf\xe9").unwrap();
        assert_eq!(entries, vec![pair("name", "café")]);
    }

    #[test]
    fn duplicate_keys_are_kept_in_order() {
        assert_eq!(parse("k=1\nk=2"), vec![pair("k", "1"), pair("k", "2")]);
    }
}
