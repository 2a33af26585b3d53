//! Word marking: the proxy's signature cosmetic transform.
//!
//! # Responsibilities
//! - Insert a trademark glyph after whitespace-delimited six-character words
//!
//! # Design Decisions
//! - Boundary rule: `(^|\s)\S{6}(\s|$)`, applied as one non-overlapping
//!   left-to-right pass. The trailing boundary is consumed by the match, so
//!   of two qualifying words separated by a single space only the first is
//!   marked. Words shorter or longer than six characters never match.

use regex::Regex;

/// Glyph inserted after each qualifying word.
pub const MARKER_GLYPH: &str = "\u{2122}";

/// Pure, stateless text transform marking six-character words.
#[derive(Debug, Clone)]
pub struct WordMarker {
    pattern: Regex,
}

impl WordMarker {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"(?P<lead>^|\s)(?P<word>\S{6})(?P<trail>\s|$)")
                .expect("word pattern is valid"),
        }
    }

    /// Return `text` with the glyph inserted after each qualifying word.
    ///
    /// Surrounding whitespace is preserved unchanged.
    pub fn mark(&self, text: &str) -> String {
        let replacement = format!("${{lead}}${{word}}{}${{trail}}", MARKER_GLYPH);
        self.pattern
            .replace_all(text, replacement.as_str())
            .into_owned()
    }
}

impl Default for WordMarker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_character_word_marked() {
        let marker = WordMarker::new();
        assert_eq!(marker.mark("mirror"), "mirror™");
    }

    #[test]
    fn test_shorter_and_longer_words_untouched() {
        let marker = WordMarker::new();
        assert_eq!(marker.mark("short"), "short");
        assert_eq!(marker.mark("mirrors"), "mirrors");
        assert_eq!(marker.mark("a bc def ghijklmnop"), "a bc def ghijklmnop");
    }

    #[test]
    fn test_adjacent_words_consume_boundary() {
        // The trailing space of the first match is consumed, so the second
        // six-character word keeps no leading boundary and stays unmarked.
        let marker = WordMarker::new();
        assert_eq!(marker.mark("mirror target"), "mirror™ target");
    }

    #[test]
    fn test_separated_words_both_marked() {
        let marker = WordMarker::new();
        assert_eq!(marker.mark("mirror  target"), "mirror™  target™");
    }

    #[test]
    fn test_glyph_count_matches_tokens() {
        let marker = WordMarker::new();
        let marked = marker.mark("enters the random stream slowly");
        assert_eq!(marked.matches(MARKER_GLYPH).count(), 3);
        assert_eq!(marked, "enters™ the random™ stream slowly™");
    }

    #[test]
    fn test_whitespace_preserved() {
        let marker = WordMarker::new();
        assert_eq!(marker.mark("  mirror\tnext"), "  mirror™\tnext");
    }

    #[test]
    fn test_no_match_across_whitespace() {
        let marker = WordMarker::new();
        assert_eq!(marker.mark("abc def"), "abc def");
    }

    #[test]
    fn test_punctuation_counts_as_word_characters() {
        // \S matches punctuation, so "ab,cd!" is a six-character token.
        let marker = WordMarker::new();
        assert_eq!(marker.mark("ab,cd!"), "ab,cd!™");
    }

    #[test]
    fn test_unicode_words_counted_by_characters() {
        let marker = WordMarker::new();
        assert_eq!(marker.mark("москва"), "москва™");
        assert_eq!(marker.mark("слово"), "слово");
    }
}
