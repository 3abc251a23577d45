//! GraphQL string literal escaping.
//!
//! Highlight mutations embed the annotation text inline, so anything the
//! model writes has to survive inside `"..."`. Backslashes are escaped before
//! quotes so an input `\"` becomes `\\\"` and decodes back to `\"`.

/// Escape `raw` for use inside a double-quoted GraphQL string value.
pub fn escape_string_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_string_value`]. Returns `None` on a malformed escape.
pub fn unescape_string_value(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '/' => out.push('/'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(escape_string_value(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_string_value(r"C:\path"), r"C:\\path");
    }

    #[test]
    fn backslash_quote_is_not_collapsed() {
        // Quote-first ordering would produce \\" here and break the literal.
        assert_eq!(escape_string_value(r#"a\"b"#), r#"a\\\"b"#);
    }

    #[test]
    fn line_breaks_are_escaped() {
        assert_eq!(escape_string_value("one\ntwo\r\n\tthree"), r"one\ntwo\r\n\tthree");
        assert_eq!(escape_string_value("\u{1}"), r"\u0001");
    }

    #[test]
    fn escaped_text_decodes_to_original() {
        let inputs = [
            "",
            "plain text",
            r#"She said "stop" and left"#,
            r"trailing backslash \",
            r#"already \"escaped\" once"#,
            "- item one\n- item two\n\n> quoted \\ \"",
            "unicode stays as is: é 漢字 🚀",
        ];
        for input in inputs {
            let escaped = escape_string_value(input);
            assert_eq!(unescape_string_value(&escaped).as_deref(), Some(input));
        }
    }

    #[test]
    fn escaped_text_has_no_bare_quotes_or_newlines() {
        let escaped = escape_string_value("a \"b\"\nc\\\"");
        assert!(!escaped.contains('\n'));

        let mut prev_backslashes = 0;
        for c in escaped.chars() {
            if c == '"' {
                assert_eq!(prev_backslashes % 2, 1, "unescaped quote in {escaped}");
            }
            prev_backslashes = if c == '\\' { prev_backslashes + 1 } else { 0 };
        }
    }

    #[test]
    fn malformed_escape_is_rejected() {
        assert_eq!(unescape_string_value(r"dangling \"), None);
        assert_eq!(unescape_string_value(r"\q"), None);
        assert_eq!(unescape_string_value(r"\u12"), None);
    }
}
