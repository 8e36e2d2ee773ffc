/// Default line budget for the audit page.
pub const DEFAULT_WRAP_WIDTH: usize = 95;

/// Greedily pack the words of `text` into lines of at most `max_chars` characters.
///
/// Whitespace runs collapse into single spaces. A word longer than the budget
/// is kept whole on its own line. Never returns an empty list: blank input
/// yields a single empty line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_yields_single_empty_line() {
        assert_eq!(wrap_text("", DEFAULT_WRAP_WIDTH), vec![String::new()]);
        assert_eq!(wrap_text(" \t\n  ", DEFAULT_WRAP_WIDTH), vec![String::new()]);
    }

    #[test]
    fn long_word_occupies_its_own_line() {
        let word = "a".repeat(120);
        assert_eq!(wrap_text(&word, DEFAULT_WRAP_WIDTH), vec![word.clone()]);

        let text = format!("short {} tail", word);
        assert_eq!(
            wrap_text(&text, DEFAULT_WRAP_WIDTH),
            vec!["short".to_owned(), word, "tail".to_owned()]
        );
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(
            wrap_text("  Signed \n\n by\t\tAlice  ", 80),
            vec!["Signed by Alice".to_owned()]
        );
    }

    #[test]
    fn packs_words_greedily() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        assert!(lines.iter().all(|line| line.chars().count() <= 9));
    }

    #[test]
    fn exact_budget_fits_on_one_line() {
        assert_eq!(wrap_text("abcd efgh", 9), vec!["abcd efgh"]);
    }

    #[test]
    fn sha256_hex_line_wraps_before_the_digest() {
        let hash = "f".repeat(64);
        let line = format!("Original Document Hash (SHA-256): {}", hash);
        let lines = wrap_text(&line, DEFAULT_WRAP_WIDTH);
        assert_eq!(lines, vec!["Original Document Hash (SHA-256):".to_owned(), hash]);
    }
}
