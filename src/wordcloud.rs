// ☁️ Word frequencies - input for the word-cloud renderer
// The renderer itself is external; this is the frequency table it consumes.

use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_MAX_WORDS: usize = 200;

/// Common English filler words, dropped before counting
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "between", "both", "but", "by", "can", "could", "did", "do",
    "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into",
    "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no", "nor", "not", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "with", "would", "you", "your", "yours",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordFrequencies {
    pub words: Vec<WordCount>,
}

impl WordFrequencies {
    /// Count normalized text (space separated), dropping stopwords
    pub fn from_text(normalized: &str, max_words: usize) -> Self {
        Self::count(
            normalized.split(' ').filter(|w| !w.is_empty() && !is_stopword(w)),
            max_words,
        )
    }

    /// Count tokens as given (entity tokens keep their case and underscores)
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S], max_words: usize) -> Self {
        Self::count(tokens.iter().map(|t| t.as_ref()), max_words)
    }

    fn count<'a>(words: impl Iterator<Item = &'a str>, max_words: usize) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in words {
            *counts.entry(word).or_insert(0) += 1;
        }

        let mut words: Vec<WordCount> = counts
            .into_iter()
            .map(|(word, count)| WordCount {
                word: word.to_string(),
                count,
            })
            .collect();

        // Most frequent first, ties alphabetical so output is stable
        words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        words.truncate(max_words);

        WordFrequencies { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.words.first().map_or(0, |w| w.count)
    }

    /// Size of `count` relative to the most frequent word, in (0, 1]
    pub fn relative_weight(&self, count: usize) -> f64 {
        match self.max_count() {
            0 => 0.0,
            max => count as f64 / max as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sorted_and_stopwords_dropped() {
        let freq = WordFrequencies::from_text("the model helped the trust model nhs", 10);

        let pairs: Vec<(&str, usize)> = freq
            .words
            .iter()
            .map(|w| (w.word.as_str(), w.count))
            .collect();
        assert_eq!(
            pairs,
            vec![("model", 2), ("helped", 1), ("nhs", 1), ("trust", 1)]
        );
        assert_eq!(freq.max_count(), 2);
        assert_eq!(freq.relative_weight(1), 0.5);
    }

    #[test]
    fn test_truncates_to_max_words() {
        let freq = WordFrequencies::from_text("alpha beta gamma delta alpha", 2);
        assert_eq!(freq.words.len(), 2);
        assert_eq!(freq.words[0].word, "alpha");
        assert_eq!(freq.words[1].word, "beta");
    }

    #[test]
    fn test_empty_text() {
        let freq = WordFrequencies::from_text("", DEFAULT_MAX_WORDS);
        assert!(freq.is_empty());
        assert_eq!(freq.relative_weight(3), 0.0);
    }

    #[test]
    fn test_entity_tokens_keep_case() {
        let freq = WordFrequencies::from_tokens(&["NHS_Trust", "Devon", "NHS_Trust"], 10);
        assert_eq!(freq.words[0].word, "NHS_Trust");
        assert_eq!(freq.words[0].count, 2);
    }
}
