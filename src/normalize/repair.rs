use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",[\s,]*([\]}])").expect("valid trailing comma regex"));

const SMART_QUOTES: [char; 4] = ['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'];

/// Applies the fixed repair sequence to an extracted payload.
///
/// Valid JSON is returned untouched. Otherwise the sequence (quotes, trailing
/// commas, escaped newlines, NUL artifacts) is re-applied until the text stops
/// changing, so repairing a repaired payload is a no-op.
pub fn repair_json(payload: &str) -> Cow<'_, str> {
    if is_valid_json(payload) {
        return Cow::Borrowed(payload);
    }

    let mut current = payload.to_owned();
    loop {
        let next = normalize_quotes(&current);
        let next = remove_trailing_commas(&next);
        let next = strip_escaped_newlines(&next);
        let next = strip_nul_artifacts(&next);
        if next == current {
            return Cow::Owned(current);
        }
        current = next;
    }
}

fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

fn normalize_quotes(text: &str) -> String {
    text.replace(SMART_QUOTES, "\"")
}

fn remove_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Drops literal `\n` escape pairs. Other escape pairs (including `\\`) are kept
/// intact so an escaped backslash followed by `n` survives.
fn strip_escaped_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => {}
            Some(next) => {
                out.push(ch);
                out.push(next);
            }
            None => out.push(ch),
        }
    }
    out
}

fn strip_nul_artifacts(text: &str) -> String {
    text.replace('\0', "").replace("\\u0000", "")
}
