use crate::matching::MatchingAlgorithm;
use crate::model::{Candidate, Ranked};
use crate::query::QueryPattern;

pub const KEYWORD_MATCH_PENALTY: i32 = -20;

pub fn rank(candidates: &[Candidate], pattern: &QueryPattern, algorithm: MatchingAlgorithm) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            score_candidate(candidate, pattern, algorithm).map(|search_score| Ranked {
                index,
                search_score,
                history_score: candidate.history_score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.combined_score().cmp(&a.combined_score()));
    ranked
}

pub fn score_candidate(
    candidate: &Candidate,
    pattern: &QueryPattern,
    algorithm: MatchingAlgorithm,
) -> Option<i32> {
    if let Some(score) = pattern.score(algorithm, &candidate.name) {
        return Some(score);
    }
    if candidate.keywords.is_empty() {
        return None;
    }
    pattern
        .score(algorithm, &candidate.keywords)
        .map(|score| score.saturating_add(KEYWORD_MATCH_PENALTY))
}
