/// Collapse any run of whitespace (including line breaks inside a header cell)
/// to one space, and trim.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased words of a label, split on whitespace.
pub fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_lowercase).collect()
}

/// True if `haystack` (lowercased by the caller) contains every word.
pub fn contains_all(haystack: &str, words: &[String]) -> bool {
    !words.is_empty() && words.iter().all(|w| haystack.contains(w.as_str()))
}

/// True if `haystack` (lowercased by the caller) contains at least one word.
pub fn contains_any<S: AsRef<str>>(haystack: &str, words: &[S]) -> bool {
    words.iter().any(|w| haystack.contains(w.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_label("  Date of\r\n   Transfer \t"), "Date of Transfer");
        assert_eq!(normalize_label("\n"), "");
    }

    #[test]
    fn word_matching() {
        let w = words("Mode of Payment");
        assert!(contains_all("payment mode of cheque", &w));
        assert!(!contains_all("payment", &w));
        assert!(contains_any("payment", &w));
        assert!(!contains_all("anything", &[]));
    }
}
