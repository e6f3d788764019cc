#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub path: String,
    pub keywords: String,
    pub search_score: i32,
    pub history_score: u32,
}

impl Candidate {
    pub fn new(id: &str, name: &str, keywords: &str) -> Self {
        Self::from_owned(id.to_string(), name.to_string(), String::new(), keywords.to_string())
    }

    pub fn from_owned(id: String, name: String, path: String, keywords: String) -> Self {
        Self {
            id,
            name,
            path,
            keywords,
            search_score: 0,
            history_score: 0,
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn with_history_score(mut self, history_score: u32) -> Self {
        self.history_score = history_score;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub index: usize,
    pub search_score: i32,
    pub history_score: u32,
}

impl Ranked {
    pub fn combined_score(&self) -> i64 {
        i64::from(self.search_score) + i64::from(self.history_score)
    }
}
