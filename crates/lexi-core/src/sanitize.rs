use std::sync::LazyLock;

use regex::Regex;

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap()
});

// Word chars follow the browser's ASCII `\w`, so accented letters are dropped too.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s'\-]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Restrict text to word characters, single spaces, hyphens and apostrophes
pub fn clean(text: &str) -> String {
    let text = HTML_ENTITY.replace_all(text, "");
    let text = DISALLOWED.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Truncating sanitizer applied to every selection before lookup
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    max_chars: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(50)
    }
}

impl Sanitizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// First `max_chars` characters of `text` (not bytes)
    pub fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_chars) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }

    /// Truncate, then [`clean`]. Empty output means "don't look anything up".
    pub fn sanitize(&self, text: &str) -> String {
        clean(self.truncate(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_allowed_chars(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || c == '\'' || c == '-')
    }

    #[test]
    fn keeps_plain_words() {
        assert_eq!(clean("serendipity"), "serendipity");
        assert_eq!(clean("  well-known  "), "well-known");
        assert_eq!(clean("don't"), "don't");
    }

    #[test]
    fn strips_entities_and_markup() {
        assert_eq!(clean("rock&amp;roll"), "rockroll");
        assert_eq!(clean("a&#39;b &#x27;c"), "ab c");
        assert_eq!(clean("<b>bold</b>"), "bboldb");
        assert_eq!(clean("hello, world!"), "hello world");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean("a \t\n  b"), "a b");
        assert_eq!(clean("one ; two"), "one two");
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!(clean("café"), "caf");
        assert_eq!(clean("日本語"), "");
    }

    #[test]
    fn output_invariants_hold_for_messy_inputs() {
        let inputs = [
            "",
            "   ",
            "&nbsp;&nbsp;x",
            "x &lt;script&gt; y",
            "tab\there\r\nnew line",
            "emoji 🎉 party",
            "quote \"this\" -- now",
            "&&&;;; & ; &amp",
            "a\u{00a0}\u{00a0}b",
        ];

        for input in inputs {
            let out = clean(input);
            assert!(only_allowed_chars(&out), "bad char in {out:?}");
            assert!(!HTML_ENTITY.is_match(&out), "entity left in {out:?}");
            assert!(!out.contains("  "), "double space in {out:?}");
            assert_eq!(out, out.trim());
            assert!(!out.chars().any(|c| c.is_whitespace() && c != ' '));
        }
    }

    #[test]
    fn truncates_to_first_fifty_chars() {
        let sanitizer = Sanitizer::default();
        let long = "abcdefghij".repeat(6);
        assert_eq!(long.chars().count(), 60);
        assert_eq!(sanitizer.truncate(&long), &long[..50]);
        assert_eq!(sanitizer.sanitize(&long), long[..50]);

        let short = "short";
        assert_eq!(sanitizer.truncate(short), short);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let sanitizer = Sanitizer::new(3);
        assert_eq!(sanitizer.truncate("ééééé"), "ééé");
    }

    #[test]
    fn truncation_happens_before_cleaning() {
        // The entity straddles the cut and so is no longer an entity
        let sanitizer = Sanitizer::new(8);
        assert_eq!(sanitizer.sanitize("abcde&amp;fgh"), "abcdeam");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(Sanitizer::default().sanitize("?!.,;:"), "");
    }
}
