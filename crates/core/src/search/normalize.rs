//! Query and title canonicalization.
//!
//! Folds accented letters to ASCII, turns filename separators into spaces and
//! strips punctuation other than the colon. The output is safe to feed back in:
//! normalizing twice gives the same string.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free-text search input.
///
/// Total and deterministic. An empty result means the input carried no
/// searchable text; callers must reject it.
pub fn normalize_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        let c = match c {
            '.' | '_' | '-' => ' ',
            c if c.is_whitespace() => ' ',
            c => c,
        };
        if c == ' ' {
            pending_space = !out.is_empty();
        } else if c.is_ascii_alphanumeric() || c == ':' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        // Anything else (punctuation, non-ASCII without a base letter) is dropped.
    }

    out
}

/// Normalize a result title for relevance matching.
///
/// Same folding as [`normalize_query`], lowercased.
pub fn normalize_title(title: &str) -> String {
    normalize_query(title).to_ascii_lowercase()
}

/// Split a normalized query into lowercase match tokens of at least `min_len` chars.
///
/// Colons separate tokens here so `"Show: S01"` yields `show` and `s01`.
pub fn query_tokens(normalized: &str, min_len: usize) -> Vec<String> {
    normalized
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|t| t.len() >= min_len)
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize_query("Amélie Poulain"), "Amelie Poulain");
        assert_eq!(normalize_query("Señor Ñandú"), "Senor Nandu");
    }

    #[test]
    fn test_drops_code_points_without_ascii_base() {
        assert_eq!(normalize_query("千と千尋 Spirited Away"), "Spirited Away");
        assert_eq!(normalize_query("日本語"), "");
    }

    #[test]
    fn test_separators_become_single_space() {
        assert_eq!(normalize_query("The.Matrix...1999"), "The Matrix 1999");
        assert_eq!(normalize_query("foo_-_bar"), "foo bar");
    }

    #[test]
    fn test_punctuation_stripped_but_colon_kept() {
        assert_eq!(normalize_query("Don't Stop! (2020)"), "Dont Stop 2020");
        assert_eq!(
            normalize_query("Star Trek: Discovery"),
            "Star Trek: Discovery"
        );
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(normalize_query("  a \t\n  b  "), "a b");
        assert_eq!(normalize_query("foo\u{3000}bar"), "foo bar");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("   "), "");
        assert_eq!(normalize_query("?!.-_"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "The.Matrix.1999.1080p",
            "Amélie (2001) [FR]",
            "  Star Trek: Picard - S01E01 ",
            "千と千尋",
            "a::b -- c",
            "",
        ];
        for input in inputs {
            let once = normalize_query(input);
            assert_eq!(normalize_query(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_deterministic() {
        let input = "Crème.Brûlée_Recipe-2024";
        assert_eq!(normalize_query(input), normalize_query(input));
    }

    #[test]
    fn test_normalize_title_lowercases() {
        assert_eq!(normalize_title("Matrix.1999.1080p"), "matrix 1999 1080p");
    }

    #[test]
    fn test_query_tokens() {
        assert_eq!(
            query_tokens("The Matrix 1999", 2),
            vec!["the", "matrix", "1999"]
        );
        assert!(query_tokens("a b", 2).is_empty());
        assert_eq!(query_tokens("Show: S01", 2), vec!["show", "s01"]);
    }
}
