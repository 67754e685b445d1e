use crate::display_width;

/// Column width error messages are wrapped to.
pub const DEFAULT_WRAP_WIDTH: usize = 40;

/// Greedy word wrap at `width` display columns.
///
/// Existing line breaks are kept, runs of whitespace collapse to one space,
/// and a single word longer than `width` stays on its own line unbroken.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let raw = raw.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_width = 0;

        for word in raw.split_whitespace() {
            let word_width = display_width(word);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }

        lines.push(current);
    }

    lines
}
