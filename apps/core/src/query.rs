use unicode_normalization::UnicodeNormalization;

use crate::matching::{self, MatchingAlgorithm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWord {
    text: String,
    scalars: Vec<char>,
}

impl PatternWord {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            scalars: text.chars().collect(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scalars(&self) -> &[char] {
        &self.scalars
    }
}

// Only the query is decomposed; targets are matched as they are.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPattern {
    raw: String,
    words: Vec<PatternWord>,
}

impl QueryPattern {
    pub fn parse(query: &str) -> Self {
        let normalized: String = query.nfd().collect();
        let words = normalized
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(PatternWord::new)
            .collect();

        Self {
            raw: query.to_string(),
            words,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[PatternWord] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn score(&self, algorithm: MatchingAlgorithm, target: &str) -> Option<i32> {
        if self.words.is_empty() {
            return Some(0);
        }

        // Fuzzy matching wants random access to the target's scalar values.
        let target_scalars: Vec<char> = match algorithm {
            MatchingAlgorithm::Fuzzy => target.chars().collect(),
            _ => Vec::new(),
        };

        let mut total = 0_i32;
        for word in &self.words {
            let score = match algorithm {
                MatchingAlgorithm::Normal => matching::substring_match(word.text(), target),
                MatchingAlgorithm::Prefix => matching::prefix_match(word.text(), target),
                MatchingAlgorithm::Fuzzy => {
                    matching::fuzzy_match(word.scalars(), &target_scalars)
                }
            }?;
            total = total.saturating_add(score);
        }
        Some(total)
    }
}
