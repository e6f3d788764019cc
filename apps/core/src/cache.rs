// Record layout, read and written byte for byte: `id \0 name \0 path \0 keywords \n`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::candidate_store::CandidateStore;
use crate::model::Candidate;

const FIELD_SEPARATOR: char = '\0';
const RECORD_SEPARATOR: char = '\n';

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to read cache {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write cache {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn encode(store: &CandidateStore) -> String {
    let mut out = String::new();
    for candidate in store {
        let fields = [
            candidate.id.as_str(),
            candidate.name.as_str(),
            candidate.path.as_str(),
            candidate.keywords.as_str(),
        ];
        if fields
            .iter()
            .any(|field| field.contains([FIELD_SEPARATOR, RECORD_SEPARATOR]))
        {
            log::warn!("cache: {:?} contains a separator, not cached", candidate.id);
            continue;
        }
        for (position, field) in fields.iter().enumerate() {
            if position > 0 {
                out.push(FIELD_SEPARATOR);
            }
            out.push_str(field);
        }
        out.push(RECORD_SEPARATOR);
    }
    out
}

pub fn decode(raw: &str) -> CandidateStore {
    let mut store = CandidateStore::new();
    for (record_number, record) in raw.split(RECORD_SEPARATOR).enumerate() {
        if record.is_empty() {
            continue;
        }
        let mut fields = record.splitn(4, FIELD_SEPARATOR);
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(name), Some(path), Some(keywords)) => {
                store.push(Candidate::from_owned(
                    id.to_string(),
                    name.to_string(),
                    path.to_string(),
                    keywords.to_string(),
                ));
            }
            _ => log::warn!("cache record {}: truncated, skipped", record_number + 1),
        }
    }
    store
}

pub fn save(path: &Path, store: &CandidateStore) -> Result<(), CacheError> {
    let write_error = |source| CacheError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, encode(store)).map_err(write_error)
}

pub fn load(path: &Path) -> Result<Option<CandidateStore>, CacheError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(decode(&raw))),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CacheError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn is_fresh(cache_path: &Path, source_dirs: &[PathBuf]) -> bool {
    let Some(cache_time) = modified(cache_path) else {
        return false;
    };
    source_dirs
        .iter()
        .filter_map(|dir| modified(dir))
        .all(|dir_time| dir_time <= cache_time)
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
