use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to read history {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write history {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub name: String,
    pub run_count: u64,
}

// Descending run_count, except new names are appended with count 1 unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Self::parse(&raw)),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(source) => Err(HistoryError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let write_error = |source| HistoryError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, self.to_text()).map_err(write_error)
    }

    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        for (line_number, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((count, name)) = line.split_once(' ') else {
                log::warn!("history line {}: missing name, skipped", line_number + 1);
                continue;
            };
            match count.trim().parse::<u64>() {
                Ok(run_count) if !name.is_empty() => entries.push(HistoryEntry {
                    name: name.to_string(),
                    run_count,
                }),
                Ok(_) => log::warn!("history line {}: empty name, skipped", line_number + 1),
                Err(error) => log::warn!(
                    "history line {}: bad run count {count:?}: {error}",
                    line_number + 1
                ),
            }
        }
        Self { entries }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.run_count.to_string());
            out.push(' ');
            out.push_str(&entry.name);
            out.push('\n');
        }
        out
    }

    pub fn add(&mut self, name: &str) {
        let Some(mut position) = self.position(name) else {
            self.entries.push(HistoryEntry {
                name: name.to_string(),
                run_count: 1,
            });
            return;
        };

        self.entries[position].run_count = self.entries[position].run_count.saturating_add(1);
        while position > 0
            && self.entries[position - 1].run_count < self.entries[position].run_count
        {
            self.entries.swap(position - 1, position);
            position -= 1;
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(position) => {
                self.entries.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
