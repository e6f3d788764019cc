use crate::candidate_store::CandidateStore;
use crate::matching::MatchingAlgorithm;
use crate::model::{Candidate, Ranked};
use crate::query::QueryPattern;
use crate::unicode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuffer {
    scalars: Vec<char>,
    text: String,
    capacity: usize,
}

impl QueryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            scalars: Vec::with_capacity(capacity),
            text: String::new(),
            capacity,
        }
    }

    pub fn push(&mut self, ch: char) -> bool {
        if self.scalars.len() >= self.capacity || !unicode::is_print(ch as u32) {
            return false;
        }
        self.scalars.push(ch);
        self.text.push(ch);
        true
    }

    pub fn pop(&mut self) -> bool {
        if self.scalars.pop().is_none() {
            return false;
        }
        self.sync_text();
        true
    }

    pub fn delete_word(&mut self) -> bool {
        if self.scalars.is_empty() {
            return false;
        }
        while self.scalars.last().is_some_and(|&ch| unicode::is_space(ch as u32)) {
            self.scalars.pop();
        }
        while self.scalars.last().is_some_and(|&ch| !unicode::is_space(ch as u32)) {
            self.scalars.pop();
        }
        self.sync_text();
        true
    }

    pub fn clear(&mut self) {
        self.scalars.clear();
        self.text.clear();
    }

    fn sync_text(&mut self) {
        self.text = self.scalars.iter().collect();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scalars(&self) -> &[char] {
        &self.scalars
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Insert(char),
    DeleteChar,
    DeleteWord,
    Clear,
    SelectPrevious,
    SelectNext,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Candidate { id: String, name: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Continue,
    Submit(Selection),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub algorithm: MatchingAlgorithm,
    pub max_query_length: usize,
    // 0 means unlimited.
    pub page_size: usize,
    pub require_match: bool,
    pub auto_accept_single: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            algorithm: MatchingAlgorithm::Normal,
            max_query_length: 256,
            page_size: 0,
            require_match: true,
            auto_accept_single: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub search_score: i32,
    pub history_score: u32,
}

#[derive(Debug, Clone)]
pub struct Session {
    store: CandidateStore,
    options: SessionOptions,
    query: QueryBuffer,
    results: Vec<Ranked>,
    selection: usize,
    first_visible: usize,
}

impl Session {
    pub fn new(store: CandidateStore, options: SessionOptions) -> Self {
        let mut session = Self {
            store,
            options,
            query: QueryBuffer::new(options.max_query_length),
            results: Vec::new(),
            selection: 0,
            first_visible: 0,
        };
        session.refilter();
        session
    }

    pub fn handle(&mut self, action: KeyAction) -> SessionEvent {
        let edited = match action {
            KeyAction::Insert(ch) => self.query.push(ch),
            KeyAction::DeleteChar => self.query.pop(),
            KeyAction::DeleteWord => self.query.delete_word(),
            KeyAction::Clear => {
                self.query.clear();
                true
            }
            KeyAction::SelectPrevious => {
                self.select_previous();
                false
            }
            KeyAction::SelectNext => {
                self.select_next();
                false
            }
            KeyAction::Submit => {
                return match self.submit() {
                    Some(selection) => SessionEvent::Submit(selection),
                    None => SessionEvent::Continue,
                };
            }
            KeyAction::Cancel => return SessionEvent::Cancel,
        };

        if edited {
            self.refilter();
            if self.options.auto_accept_single && self.results.len() == 1 {
                if let Some(selection) = self.submit() {
                    return SessionEvent::Submit(selection);
                }
            }
        }
        SessionEvent::Continue
    }

    pub fn refilter(&mut self) {
        let pattern = QueryPattern::parse(self.query.text());
        self.results = self.store.filter(&pattern, self.options.algorithm);
        self.selection = 0;
        self.first_visible = 0;
        log::debug!(
            "query {:?}: {} of {} candidates",
            self.query.text(),
            self.results.len(),
            self.store.len()
        );
    }

    fn page_len(&self) -> usize {
        let remaining = self.results.len().saturating_sub(self.first_visible);
        let page = match self.options.page_size {
            0 => remaining,
            size => size.min(remaining),
        };
        page.max(1)
    }

    pub fn select_next(&mut self) {
        let page = self.page_len();
        self.selection += 1;
        if self.selection >= page {
            self.selection -= page;
            self.first_visible = if self.results.is_empty() {
                0
            } else {
                (self.first_visible + page) % self.results.len()
            };
        }
    }

    pub fn select_previous(&mut self) {
        if self.selection > 0 {
            self.selection -= 1;
            return;
        }
        if self.first_visible == 0 {
            return;
        }
        let step = match self.options.page_size {
            0 => self.first_visible,
            size => size.min(self.first_visible),
        };
        self.first_visible -= step;
        self.selection = step - 1;
    }

    fn submit(&self) -> Option<Selection> {
        if let Some(candidate) = self.selected() {
            return Some(Selection::Candidate {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
            });
        }
        if self.results.is_empty() && !self.options.require_match {
            return Some(Selection::Text(self.query.text().to_string()));
        }
        None
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.options.page_size = page_size;
        self.selection = 0;
        self.first_visible = 0;
    }

    pub fn selected(&self) -> Option<&Candidate> {
        let hit = self.results.get(self.first_visible + self.selection)?;
        self.store.get(hit.index)
    }

    pub fn selected_index(&self) -> usize {
        self.first_visible + self.selection
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn first_visible(&self) -> usize {
        self.first_visible
    }

    pub fn query(&self) -> &QueryBuffer {
        &self.query
    }

    pub fn store(&self) -> &CandidateStore {
        &self.store
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn results(&self) -> impl Iterator<Item = ResultRow<'_>> + Clone + '_ {
        self.results.iter().filter_map(|hit| {
            let candidate = self.store.get(hit.index)?;
            Some(ResultRow {
                id: &candidate.id,
                name: &candidate.name,
                search_score: hit.search_score,
                history_score: hit.history_score,
            })
        })
    }

    pub fn visible_results(&self) -> impl Iterator<Item = ResultRow<'_>> + Clone + '_ {
        let take = match self.options.page_size {
            0 => usize::MAX,
            size => size,
        };
        self.results().skip(self.first_visible).take(take)
    }

    pub fn update_store<F: FnOnce(&mut CandidateStore)>(&mut self, update: F) {
        update(&mut self.store);
        self.refilter();
    }
}
