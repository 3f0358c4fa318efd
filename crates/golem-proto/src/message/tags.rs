//! IRCv3 message tag value escaping.
//!
//! `\:` is `;`, `\s` is a space, `\\` is a backslash, `\r` and `\n` are
//! CR and LF. Unknown escapes drop the backslash; a trailing lone backslash
//! is dropped.

use std::fmt::{Result as FmtResult, Write};

/// Write `value` to `f` in escaped wire form.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Decode an escaped wire value.
pub fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_known_sequences() {
        assert_eq!(unescape_tag_value("a\\:b\\sc\\\\d\\re\\nf"), "a;b c\\d\re\nf");
    }

    #[test]
    fn unknown_escape_keeps_char() {
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
    }

    #[test]
    fn trailing_backslash_dropped() {
        assert_eq!(unescape_tag_value("bot\\"), "bot");
    }

    #[test]
    fn escape_display_name_with_space() {
        let mut out = String::new();
        escape_tag_value(&mut out, "Pump 19;x").unwrap();
        assert_eq!(out, "Pump\\s19\\:x");
        assert_eq!(unescape_tag_value(&out), "Pump 19;x");
    }
}
