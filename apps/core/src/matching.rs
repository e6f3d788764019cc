use serde::{Deserialize, Serialize};

use crate::query::QueryPattern;
use crate::unicode::{self, fold};

// Longer targets only try the first occurrence of each pattern scalar.
pub const EXHAUSTIVE_FUZZY_LIMIT: usize = 100;

const NO_MATCH: i32 = i32::MIN;

const UNMATCHED_LETTER_PENALTY: i32 = -1;
const ADJACENCY_BONUS: i32 = 15;
const SEPARATOR_BONUS: i32 = 30;
const CAMEL_BONUS: i32 = 30;
const FIRST_LETTER_BONUS: i32 = 15;
const LEADING_LETTER_PENALTY: i32 = -5;
const MAX_LEADING_LETTER_PENALTY: i32 = -15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingAlgorithm {
    #[default]
    Normal,
    Prefix,
    Fuzzy,
}

impl MatchingAlgorithm {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "prefix" => Some(Self::Prefix),
            "fuzzy" => Some(Self::Fuzzy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Prefix => "prefix",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl std::fmt::Display for MatchingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn match_words(algorithm: MatchingAlgorithm, query: &str, target: &str) -> Option<i32> {
    QueryPattern::parse(query).score(algorithm, target)
}

pub fn substring_match(word: &str, target: &str) -> Option<i32> {
    if word.is_empty() {
        return Some(0);
    }
    let offset = unicode::find_ignore_case(target, word)?;
    Some(-clamp_to_i32(offset))
}

pub fn prefix_match(word: &str, target: &str) -> Option<i32> {
    if word.is_empty() {
        return Some(0);
    }
    if !unicode::starts_with_ignore_case(target, word) {
        return None;
    }
    let unmatched = unicode::scalar_len(target).saturating_sub(unicode::scalar_len(word));
    Some(-clamp_to_i32(unmatched))
}

pub fn fuzzy_match(pattern: &[char], target: &[char]) -> Option<i32> {
    if pattern.is_empty() {
        return Some(0);
    }
    if target.len() < pattern.len() {
        return None;
    }

    let best = Aligner::new(pattern, target).best(0, 0);
    if best == NO_MATCH {
        return None;
    }

    let unmatched = clamp_to_i32(target.len() - pattern.len());
    Some(best.saturating_add(UNMATCHED_LETTER_PENALTY.saturating_mul(unmatched)))
}

struct Aligner<'a> {
    pattern: Vec<char>,
    target: &'a [char],
    exhaustive: bool,
    // Best score for pattern[offset..] starting at target[from..], indexed by
    // `offset * (target.len() + 1) + from`. Empty when not exhaustive.
    tails: Vec<Option<i32>>,
}

impl<'a> Aligner<'a> {
    fn new(pattern: &[char], target: &'a [char]) -> Self {
        let exhaustive = target.len() <= EXHAUSTIVE_FUZZY_LIMIT;
        let tails = if exhaustive {
            vec![None; pattern.len() * (target.len() + 1)]
        } else {
            Vec::new()
        };
        Self {
            pattern: pattern.iter().map(|&ch| fold(ch)).collect(),
            target,
            exhaustive,
            tails,
        }
    }

    fn best(&mut self, offset: usize, from: usize) -> i32 {
        if offset == self.pattern.len() {
            return 0;
        }
        let slot = offset * (self.target.len() + 1) + from;
        if let Some(Some(score)) = self.tails.get(slot) {
            return *score;
        }
        let score = self.search(offset, from);
        if let Some(cell) = self.tails.get_mut(slot) {
            *cell = Some(score);
        }
        score
    }

    fn search(&mut self, offset: usize, from: usize) -> i32 {
        let target = self.target;
        let wanted = self.pattern[offset];
        let remaining = self.pattern.len() - offset - 1;
        let first = offset == 0;

        let mut best = NO_MATCH;
        let mut cursor = from;
        while target.len() - cursor > remaining {
            let Some(step) = target[cursor..].iter().position(|&ch| fold(ch) == wanted) else {
                break;
            };
            let index = cursor + step;
            if target.len() - index <= remaining {
                break;
            }

            let tail = self.best(offset + 1, index + 1);
            if tail != NO_MATCH {
                let here = char_score(target, index, index - from, first);
                best = best.max(here.saturating_add(tail));
            }

            // The earliest occurrence is always feasible if any is.
            if !self.exhaustive {
                break;
            }
            cursor = index + 1;
        }
        best
    }
}

fn char_score(target: &[char], index: usize, gap: usize, first: bool) -> i32 {
    let current = target[index] as u32;
    let mut score = 0;

    if !first && gap == 0 {
        score += ADJACENCY_BONUS;
    }

    if (!first || gap > 0) && index > 0 {
        let previous = target[index - 1] as u32;
        if unicode::is_upper(current) && unicode::is_lower(previous) {
            score += CAMEL_BONUS;
        }
        if unicode::is_alnum(current) && !unicode::is_alnum(previous) {
            score += SEPARATOR_BONUS;
        }
    }

    if first {
        if gap == 0 {
            score += FIRST_LETTER_BONUS;
        }
        let gap = clamp_to_i32(gap);
        score += LEADING_LETTER_PENALTY
            .saturating_mul(gap)
            .max(MAX_LEADING_LETTER_PENALTY);
    }

    score
}

fn clamp_to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
