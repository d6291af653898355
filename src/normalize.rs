//! Text canonicalization shared by training and both classifier backends.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// Normalize a transaction description.
///
/// Lowercases, replaces everything outside `[a-z0-9]` and whitespace with a
/// space, collapses whitespace runs and trims. Total and idempotent; the empty
/// string stands in for absent input.
pub fn normalize(text: &str) -> String {
    let lowercase = text.to_lowercase();
    let cleaned = NON_ALNUM.replace_all(&lowercase, " ");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

/// Whitespace-split tokens of the normalized text, in order, repeats kept.
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The distinct tokens of the normalized text.
pub fn unique_tokens(text: &str) -> BTreeSet<String> {
    tokens(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  STARBUCKS #1234 -- Seattle, WA "), "starbucks 1234 seattle wa");
        assert_eq!(normalize("Café\tNoir"), "caf noir");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "AMZN Mktp US*2K3 ",
            "Uber   *Trip\u{00a0}HELP.UBER.COM",
            "ÅÄÖ straße 42",
            "",
            "already normal text",
            "tab\tand\nnewline",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_tokens_keep_repeats_and_unique_dedups() {
        assert_eq!(tokens("coffee Coffee shop"), vec!["coffee", "coffee", "shop"]);
        let unique = unique_tokens("coffee Coffee shop");
        assert_eq!(unique.len(), 2);
        assert!(tokens("   ").is_empty());
    }
}
