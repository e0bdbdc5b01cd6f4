// 🧹 Text Normalizer
// Raw blurbs/quotes -> lowercased, punctuation-free tokens for the word cloud.

/// Split on whitespace, strip ASCII punctuation, lowercase.
/// Tokens that were nothing but punctuation are dropped.
pub fn tokenize<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    texts
        .iter()
        .flat_map(|text| text.as_ref().split_whitespace())
        .filter_map(|word| {
            let cleaned: String = word
                .chars()
                .filter(|c| !c.is_ascii_punctuation())
                .flat_map(char::to_lowercase)
                .collect();
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .collect()
}

/// Tokens rejoined with single spaces: the renderer's input.
pub fn normalize<S: AsRef<str>>(texts: &[S]) -> String {
    tokenize(texts).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_and_case() {
        let tokens = tokenize(&["Hello, World!  HELLO."]);
        assert_eq!(tokens, vec!["hello", "world", "hello"]);
        assert_eq!(normalize(&["Hello, World!  HELLO."]), "hello world hello");
    }

    #[test]
    fn test_empty_input() {
        let none: [&str; 0] = [];
        assert_eq!(normalize(&none), "");
        assert_eq!(normalize(&["", "   "]), "");
    }

    #[test]
    fn test_texts_are_joined_with_spaces() {
        // The end of one blurb never fuses with the start of the next
        let tokens = tokenize(&["ends here", "starts here"]);
        assert_eq!(tokens, vec!["ends", "here", "starts", "here"]);
    }

    #[test]
    fn test_blurb_tokens() {
        let tokens = tokenize(&["Launched a pilot programme with NHS Trust"]);
        assert_eq!(
            tokens,
            vec!["launched", "a", "pilot", "programme", "with", "nhs", "trust"]
        );
    }

    #[test]
    fn test_inner_punctuation_and_lone_symbols() {
        let tokens = tokenize(&["co-design -- NHS's (pilot) https://x.org"]);
        assert_eq!(tokens, vec!["codesign", "nhss", "pilot", "httpsxorg"]);
    }

    #[test]
    fn test_non_ascii_is_kept() {
        assert_eq!(normalize(&["Café “Über”"]), "café “über”");
    }
}
