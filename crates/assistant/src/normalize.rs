//! Output normalization for raw assistant text.
//!
//! The assistant runs behind a terminal-oriented relay, so its output can
//! carry color codes, an echoed `>` prompt marker and HTML-escaped markup.

use regex_lite::{Captures, Regex};
use std::sync::LazyLock;

/// ANSI escape sequences: two-byte `ESC x` forms and CSI `ESC [ ... final`.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ANSI escape pattern is valid")
});

/// Character references, with or without the closing `;`.
static CHAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*)(;?)")
        .expect("character reference pattern is valid")
});

/// Named references HTML also accepts without a closing `;`.
const LEGACY_NAMES: &[&str] = &[
    "AMP", "COPY", "GT", "LT", "QUOT", "REG", "amp", "cent", "copy", "deg", "divide", "frac12",
    "frac14", "frac34", "gt", "laquo", "lt", "middot", "nbsp", "para", "plusmn", "pound", "quot",
    "raquo", "reg", "sect", "times", "yen",
];

/// Remove ANSI terminal escape sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Remove one leading `>` prompt marker and the whitespace after it.
pub fn strip_prompt_marker(text: &str) -> &str {
    let text = text.trim_start();
    text.strip_prefix('>').map_or(text, str::trim_start)
}

/// Decode HTML character references in one pass.
///
/// Numeric references and the names in [`LEGACY_NAMES`] decode even without
/// the trailing `;` (`&amp b` → `& b`, `&copy 2024` → `© 2024`). Decoded text
/// is never decoded again.
pub fn unescape_html(text: &str) -> String {
    CHAR_REF
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            if !caps[2].is_empty() || name.starts_with('#') {
                return html_escape::decode_html_entities(&format!("&{name};")).into_owned();
            }
            // Longest legacy name that prefixes the run, the rest stays literal.
            match LEGACY_NAMES
                .iter()
                .filter(|legacy| name.starts_with(**legacy))
                .max_by_key(|legacy| legacy.len())
            {
                Some(legacy) => format!(
                    "{}{}",
                    html_escape::decode_html_entities(&format!("&{legacy};")),
                    &name[legacy.len()..]
                ),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Normalize raw assistant output into answer text.
///
/// Order: trim, strip ANSI, strip prompt marker, trim, unescape HTML entities.
pub fn normalize_output(raw: &str) -> String {
    let without_ansi = strip_ansi(raw.trim());
    let answer = strip_prompt_marker(&without_ansi).trim();
    unescape_html(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_prompt_output() {
        assert_eq!(
            normalize_output("\x1b[32m> Hello &amp; world\x1b[0m"),
            "Hello & world"
        );
    }

    #[test]
    fn strips_cursor_and_erase_sequences() {
        assert_eq!(strip_ansi("\x1b[2K\x1b[1Gdone\x1b[?25h"), "done");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn only_one_marker_removed() {
        assert_eq!(normalize_output(">  > quoted"), "> quoted");
        assert_eq!(normalize_output("no marker"), "no marker");
    }

    #[test]
    fn marker_after_leading_whitespace() {
        assert_eq!(normalize_output("\n\n  >answer\n"), "answer");
    }

    #[test]
    fn entities_decoded_after_trim() {
        assert_eq!(
            normalize_output("  &lt;b&gt;orders&lt;/b&gt; &quot;q&quot; &#39;x&#39;  "),
            "<b>orders</b> \"q\" 'x'"
        );
    }

    #[test]
    fn entities_without_semicolon_decoded() {
        assert_eq!(normalize_output("a &amp b"), "a & b");
        assert_eq!(normalize_output("&copy 2024"), "\u{a9} 2024");
        assert_eq!(unescape_html("x &lt y &gt z"), "x < y > z");
        assert_eq!(unescape_html("&ampx &#39quoted&#39"), "&x 'quoted'");
    }

    #[test]
    fn decoded_text_is_not_decoded_again() {
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
        assert_eq!(unescape_html("&amp;amp b"), "&amp b");
    }

    #[test]
    fn unknown_names_left_alone() {
        assert_eq!(unescape_html("R&D &foo; &bogus"), "R&D &foo; &bogus");
        assert_eq!(unescape_html("fish & chips"), "fish & chips");
    }

    #[test]
    fn multiline_markdown_preserved() {
        let raw = "> ### Bottom Line\n\n- **orders** &gt; 10\n";
        assert_eq!(normalize_output(raw), "### Bottom Line\n\n- **orders** > 10");
    }

    #[test]
    fn empty_output() {
        assert_eq!(normalize_output("   "), "");
        assert_eq!(normalize_output("\x1b[0m>"), "");
    }
}
