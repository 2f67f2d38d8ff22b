//! Output formatting: type-name clean-up, character-safe display, and the
//! windowed string differ shared by [`crate::builtin::string`] and the
//! top-level failure-message renderer.

use std::any::type_name;

/// Cosmetic clean-up of `std::any::type_name::<T>()` for display: strips a
/// handful of noisy crate-path prefixes and inserts a space between adjacent
/// closing angle brackets, matching the spacing convention of the failure
/// messages this framework has always printed.
pub fn clean_type_name<T: ?Sized>() -> String {
    cosmetic_cleanup(type_name::<T>())
}

fn cosmetic_cleanup(raw: &str) -> String {
    let stripped = raw
        .replace("alloc::string::", "")
        .replace("alloc::vec::", "")
        .replace("alloc::boxed::", "")
        .replace("alloc::sync::", "")
        .replace("alloc::rc::", "")
        .replace("core::option::", "")
        .replace("core::result::", "");
    stripped.replace(">>", "> >")
}

/// Renders a value for display, escaping control characters and wrapping
/// runs of leading/trailing whitespace so they remain visible in a terminal.
pub fn display_safe(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    if out.starts_with(' ') || out.ends_with(' ') {
        out = format!("\u{ab}{out}\u{bb}");
    }
    out
}

/// Converts an arbitrary test name into the `snake_case` stem used to derive
/// diagnostic file names.
pub fn to_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_whitespace() || c == '-' {
            out.push('_');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev_lower = c.is_lowercase();
    }
    out
}

/// Width of the context window shown around a string diff.
const WINDOW: usize = 20;

/// Locates the first index at which `a` and `b` differ, in `char` units.
pub fn first_diff_index(a: &str, b: &str) -> Option<usize> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let shortest = a_chars.len().min(b_chars.len());
    for i in 0..shortest {
        if a_chars[i] != b_chars[i] {
            return Some(i);
        }
    }
    if a_chars.len() != b_chars.len() {
        Some(shortest)
    } else {
        None
    }
}

/// Produces a windowed snippet of `s` around `index`, bounded by `WINDOW`
/// characters either side, with an ellipsis marking any elided prefix or
/// suffix.
pub fn windowed_snippet(s: &str, index: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let start = index.saturating_sub(WINDOW);
    let end = (index + WINDOW).min(chars.len());
    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

/// Formats a full diff explanation for two differing strings, naming the
/// differing index and showing windowed snippets from both sides.
pub fn string_diff_message(obtained: &str, predicted: &str) -> String {
    match first_diff_index(obtained, predicted) {
        None => "strings match".to_string(),
        Some(index) => format!(
            "strings differ at character {index}\n  obtained:  {}\n  predicted: {}",
            windowed_snippet(obtained, index),
            windowed_snippet(predicted, index),
        ),
    }
}
