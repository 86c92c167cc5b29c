// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::borrow::Cow;

/// Escapes text for use inside a TeamCity service message attribute value.
///
/// The characters replaced, and their escape sequences:
///
/// | character | escape |
/// |-----------|--------|
/// | `\|`      | `\|\|` |
/// | `'`       | `\|'`  |
/// | `\n`      | `\|n`  |
/// | `\r`      | `\|r`  |
/// | U+0086    | `\|x`  |
/// | U+2028    | `\|l`  |
/// | U+2029    | `\|p`  |
/// | `[`       | `\|[`  |
/// | `]`       | `\|]`  |
///
/// A pipe that already starts a valid escape sequence is passed through
/// untouched, which makes this function idempotent: feeding its output back
/// in returns the output unchanged. Text that needs no replacements is
/// returned borrowed.
///
/// # Examples
///
/// ```
/// use quick_teamcity::escape;
///
/// assert_eq!(escape("a|b'c"), "a||b|'c");
/// assert_eq!(escape("a||b|'c"), "a||b|'c");
/// ```
pub fn escape(input: &str) -> Cow<'_, str> {
    let mut escaped: Option<String> = None;
    let mut iter = input.char_indices().peekable();

    while let Some((idx, c)) = iter.next() {
        if c == '|' {
            // A pipe followed by a valid suffix is already an escape
            // sequence. Consume both characters so the suffix can't be
            // re-escaped on a second pass.
            if let Some(&(_, next)) = iter.peek() {
                if is_escape_suffix(next) {
                    if let Some(escaped) = escaped.as_mut() {
                        escaped.push('|');
                        escaped.push(next);
                    }
                    iter.next();
                    continue;
                }
            }
            escaped
                .get_or_insert_with(|| input[..idx].to_owned())
                .push_str("||");
        } else if let Some(replacement) = escape_char(c) {
            escaped
                .get_or_insert_with(|| input[..idx].to_owned())
                .push_str(replacement);
        } else if let Some(escaped) = escaped.as_mut() {
            escaped.push(c);
        }
    }

    match escaped {
        Some(escaped) => Cow::Owned(escaped),
        None => Cow::Borrowed(input),
    }
}

fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '|' => Some("||"),
        '\'' => Some("|'"),
        '\n' => Some("|n"),
        '\r' => Some("|r"),
        '\u{0086}' => Some("|x"),
        '\u{2028}' => Some("|l"),
        '\u{2029}' => Some("|p"),
        '[' => Some("|["),
        ']' => Some("|]"),
        _ => None,
    }
}

fn is_escape_suffix(c: char) -> bool {
    matches!(c, '|' | '\'' | 'n' | 'r' | 'x' | 'l' | 'p' | '[' | ']')
}
