use crate::history::History;
use crate::matching::MatchingAlgorithm;
use crate::model::{Candidate, Ranked};
use crate::query::QueryPattern;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: &str, name: &str, keywords: &str) {
        self.candidates.push(Candidate::new(id, name, keywords));
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn sort(&mut self) {
        self.candidates.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn is_sorted(&self) -> bool {
        self.candidates.windows(2).all(|pair| pair[0].name <= pair[1].name)
    }

    pub fn dedup_by_id(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.candidates.retain(|candidate| seen.insert(candidate.id.clone()));
    }

    pub fn find(&self, name: &str) -> Option<&Candidate> {
        self.search(name).map(|index| &self.candidates[index])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Candidate> {
        self.search(name).map(move |index| &mut self.candidates[index])
    }

    fn search(&self, name: &str) -> Option<usize> {
        let range = self.name_range(name);
        (!range.is_empty()).then_some(range.start)
    }

    // Every candidate called `name`; dmenu stores may hold several.
    fn name_range(&self, name: &str) -> std::ops::Range<usize> {
        debug_assert!(self.is_sorted(), "candidate store searched before sort()");
        let start = self
            .candidates
            .partition_point(|candidate| candidate.name.as_str() < name);
        let len = self.candidates[start..].partition_point(|candidate| candidate.name == name);
        start..start + len
    }

    pub fn apply_history(&mut self, history: &History) {
        for candidate in &mut self.candidates {
            candidate.history_score = 0;
        }
        for entry in history.entries() {
            let score = u32::try_from(entry.run_count).unwrap_or(u32::MAX);
            let range = self.name_range(&entry.name);
            for candidate in &mut self.candidates[range] {
                candidate.history_score = score;
            }
        }
    }

    pub fn filter(&mut self, pattern: &QueryPattern, algorithm: MatchingAlgorithm) -> Vec<Ranked> {
        let ranked = crate::search::rank(&self.candidates, pattern, algorithm);
        for hit in &ranked {
            self.candidates[hit.index].search_score = hit.search_score;
        }
        ranked
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl FromIterator<Candidate> for CandidateStore {
    fn from_iter<T: IntoIterator<Item = Candidate>>(iter: T) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CandidateStore {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::CandidateStore;
    use crate::history::History;

    #[test]
    fn history_reaches_every_candidate_with_the_same_name() {
        let mut store = CandidateStore::new();
        for id in ["beta-1", "alpha", "beta-2", "gamma", "beta-3"] {
            store.add(id, id.split('-').next().unwrap_or(id), "");
        }
        store.sort();

        store.apply_history(&History::parse("7 beta\n2 gamma\n"));

        let scores: Vec<(&str, u32)> = store
            .iter()
            .map(|candidate| (candidate.id.as_str(), candidate.history_score))
            .collect();
        assert_eq!(
            scores,
            vec![("alpha", 0), ("beta-1", 7), ("beta-2", 7), ("beta-3", 7), ("gamma", 2)]
        );
    }

    #[test]
    fn find_returns_first_of_equal_names() {
        let mut store = CandidateStore::new();
        store.add("one", "dup", "");
        store.add("two", "dup", "");
        store.sort();
        assert_eq!(store.find("dup").map(|candidate| candidate.id.as_str()), Some("one"));
        assert!(store.find("missing").is_none());
    }
}
