//! Common utility functions shared across the codebase.

use unicode_width::UnicodeWidthChar;

/// Checks if the text contains at least one native-script (CJK ideograph) character.
///
/// Used both by the advisory linter (to flag unmarked native text) and by the
/// translation store (to reject native text smuggled into a translated resource).
pub fn contains_native_script(text: &str) -> bool {
    text.chars().any(is_native_script)
}

fn is_native_script(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fa5}' | '\u{f900}'..='\u{faff}')
}

/// Count translation effort units the way translation vendors bill them:
/// every wide (full-width) character is one unit, and every maximal run of
/// narrow characters is one unit regardless of its length.
///
/// `"你好 world"` is 3 units: two ideographs plus one narrow segment.
pub fn count_translation_units(text: &str) -> usize {
    let mut wide = 0;
    let narrowed: String = text
        .chars()
        .map(|c| {
            if UnicodeWidthChar::width(c).unwrap_or(0) >= 2 {
                wide += 1;
                ' '
            } else {
                c
            }
        })
        .collect();

    wide + narrowed.split_whitespace().count()
}

/// Collapse every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_ws = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

/// Remove all whitespace. Two sentences are "the same" for key derivation and
/// translation-identity checks when they are equal under this normalization.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
