use serde::{Deserialize, Serialize};

use crate::matching::MatchingAlgorithm;
use crate::session::{ResultRow, Selection, Session};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRowDto {
    pub id: String,
    pub name: String,
    pub search_score: i32,
    pub history_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub query: String,
    pub algorithm: MatchingAlgorithm,
    pub total: usize,
    pub first_visible: usize,
    pub selection: usize,
    pub results: Vec<ResultRowDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectionDto {
    Candidate { id: String, name: String },
    Text(String),
}

impl From<ResultRow<'_>> for ResultRowDto {
    fn from(value: ResultRow<'_>) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            search_score: value.search_score,
            history_score: value.history_score,
        }
    }
}

impl From<Selection> for SelectionDto {
    fn from(value: Selection) -> Self {
        match value {
            Selection::Candidate { id, name } => Self::Candidate { id, name },
            Selection::Text(text) => Self::Text(text),
        }
    }
}

impl QueryResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            query: session.query().text().to_string(),
            algorithm: session.options().algorithm,
            total: session.result_count(),
            first_visible: session.first_visible(),
            selection: session.selection(),
            results: session.visible_results().map(ResultRowDto::from).collect(),
        }
    }
}
