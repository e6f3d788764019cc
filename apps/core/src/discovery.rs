use std::cell::RefCell;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::candidate_store::CandidateStore;
use crate::model::Candidate;

#[derive(Debug, thiserror::Error)]
#[error("{provider}: {message}")]
pub struct ProviderError {
    provider: &'static str,
    message: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

pub trait DiscoveryProvider {
    fn provider_name(&self) -> &'static str;
    fn discover(&self) -> Result<Vec<Candidate>, ProviderError>;

    fn dedups_by_id(&self) -> bool {
        true
    }

    fn source_dirs(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

pub fn build_store(provider: &dyn DiscoveryProvider) -> Result<CandidateStore, ProviderError> {
    let mut store = CandidateStore::new();
    for candidate in provider.discover()? {
        store.push(candidate);
    }
    if provider.dedups_by_id() {
        store.dedup_by_id();
    }
    store.sort();
    log::info!(
        "{}: discovered {} candidates",
        provider.provider_name(),
        store.len()
    );
    Ok(store)
}

pub struct PathProvider {
    dirs: Vec<PathBuf>,
}

impl PathProvider {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|raw| std::env::split_paths(&raw).collect())
            .unwrap_or_default();
        Self::new(dirs)
    }
}

impl DiscoveryProvider for PathProvider {
    fn provider_name(&self) -> &'static str {
        "path"
    }

    fn discover(&self) -> Result<Vec<Candidate>, ProviderError> {
        let mut out = Vec::new();
        for dir in &self.dirs {
            for entry in WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if !entry.file_type().is_file() || !is_executable(entry.path()) {
                    continue;
                }
                let Some(name) = entry.file_name().to_str() else {
                    continue;
                };
                out.push(Candidate::from_owned(
                    name.to_string(),
                    name.to_string(),
                    entry.path().to_string_lossy().into_owned(),
                    String::new(),
                ));
            }
        }
        Ok(out)
    }

    fn source_dirs(&self) -> Vec<PathBuf> {
        self.dirs.clone()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|meta| meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

pub struct DesktopEntryProvider {
    // Highest precedence first.
    roots: Vec<PathBuf>,
    locale: Option<String>,
}

impl DesktopEntryProvider {
    pub fn new(roots: Vec<PathBuf>, locale: Option<String>) -> Self {
        Self { roots, locale }
    }

    pub fn from_env() -> Self {
        let mut data_dirs = Vec::new();
        if let Some(home) = dirs::data_dir() {
            data_dirs.push(home);
        }
        let system = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
        data_dirs.extend(std::env::split_paths(&system));

        let roots = data_dirs
            .into_iter()
            .map(|dir| dir.join("applications"))
            .collect();
        Self::new(roots, locale_from_env())
    }
}

impl DiscoveryProvider for DesktopEntryProvider {
    fn provider_name(&self) -> &'static str {
        "desktop"
    }

    // An earlier root shadows later ones, even when its entry is hidden.
    fn discover(&self) -> Result<Vec<Candidate>, ProviderError> {
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for root in &self.roots {
            for entry in WalkDir::new(root)
                .min_depth(1)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|ext| ext.to_str()) != Some("desktop")
                {
                    continue;
                }
                let Some(id) = desktop_file_id(root, path) else {
                    continue;
                };
                if !seen.insert(id.clone()) {
                    continue;
                }
                let raw = match std::fs::read_to_string(path) {
                    Ok(raw) => raw,
                    Err(error) => {
                        log::warn!("desktop: failed to read {}: {error}", path.display());
                        continue;
                    }
                };
                if let Some(app) = parse_desktop_entry(&raw, self.locale.as_deref()) {
                    out.push(Candidate::from_owned(
                        id,
                        app.name,
                        path.to_string_lossy().into_owned(),
                        app.keywords,
                    ));
                }
            }
        }
        Ok(out)
    }

    fn source_dirs(&self) -> Vec<PathBuf> {
        self.roots.clone()
    }
}

fn desktop_file_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("-"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopApp {
    pub name: String,
    pub keywords: String,
}

pub fn parse_desktop_entry(raw: &str, locale: Option<&str>) -> Option<DesktopApp> {
    let mut in_main_group = false;
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_main_group = line == "[Desktop Entry]";
            continue;
        }
        if !in_main_group {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            fields.entry(key.trim()).or_insert(value.trim());
        }
    }

    if fields.get("Type").copied() != Some("Application") {
        return None;
    }
    let is_true = |key: &str| fields.get(key).is_some_and(|value| *value == "true");
    if is_true("NoDisplay") || is_true("Hidden") {
        return None;
    }

    let name = localized(&fields, "Name", locale)?;
    if name.is_empty() {
        return None;
    }
    let keywords = localized(&fields, "Keywords", locale)
        .map(|raw| {
            raw.split(';')
                .filter(|keyword| !keyword.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    Some(DesktopApp {
        name: name.to_string(),
        keywords,
    })
}

fn localized<'a>(fields: &HashMap<&str, &'a str>, key: &str, locale: Option<&str>) -> Option<&'a str> {
    if let Some(locale) = locale {
        if let Some(value) = fields.get(format!("{key}[{locale}]").as_str()) {
            return Some(*value);
        }
        if let Some((language, _)) = locale.split_once('_') {
            if let Some(value) = fields.get(format!("{key}[{language}]").as_str()) {
                return Some(*value);
            }
        }
    }
    fields.get(key).copied()
}

fn locale_from_env() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .map(|value| {
            value
                .split(['.', '@'])
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .filter(|value| value != "C" && value != "POSIX" && !value.is_empty())
}

pub struct LineProvider<R> {
    // Taken by the first discover(); later calls see None.
    reader: RefCell<Option<R>>,
}

impl<R: BufRead> LineProvider<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: RefCell::new(Some(reader)),
        }
    }
}

impl<R: BufRead> DiscoveryProvider for LineProvider<R> {
    fn provider_name(&self) -> &'static str {
        "lines"
    }

    fn discover(&self) -> Result<Vec<Candidate>, ProviderError> {
        let Some(reader) = self.reader.borrow_mut().take() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|error| ProviderError::new("lines", error.to_string()))?;
            if line.is_empty() {
                continue;
            }
            out.push(Candidate::new(&line, &line, ""));
        }
        Ok(out)
    }

    fn dedups_by_id(&self) -> bool {
        false
    }
}
