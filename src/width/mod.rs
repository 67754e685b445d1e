//! Display width helpers for item names and lore lines.
//!
//! Item text may carry ANSI styling when rendered by a terminal host, so widths
//! are measured on the stripped text.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(visible_text(text).as_str())
}

/// Return the text with any ANSI escape sequences removed.
pub fn visible_text(text: &str) -> String {
    let clean = strip_ansi_escapes::strip(text);
    String::from_utf8_lossy(&clean).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_width() {
        assert_eq!(display_width("cannot place item"), 17);
    }

    #[test]
    fn ansi_sequences_are_ignored() {
        assert_eq!(display_width("\x1b[1;31mUh oh!\x1b[0m"), 6);
        assert_eq!(visible_text("\x1b[31mred\x1b[0m"), "red");
    }

    #[test]
    fn wide_glyphs_count_double() {
        assert_eq!(display_width("箱"), 2);
    }
}
