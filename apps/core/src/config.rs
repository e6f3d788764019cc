use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::matching::MatchingAlgorithm;

const APP_DIR_NAME: &str = "sift";
const DEFAULT_MAX_QUERY_LENGTH: usize = 256;
const MAX_QUERY_LENGTH_CEILING: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
    #[error("malformed override '{0}', expected key=value")]
    MalformedOverride(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub matching_algorithm: MatchingAlgorithm,
    // 0 means as many as the renderer shows.
    pub num_results: usize,
    // None leaves the choice to the mode.
    pub history: Option<bool>,
    pub history_file: Option<PathBuf>,
    pub require_match: bool,
    pub auto_accept_single: bool,
    pub max_query_length: usize,
    pub cache: bool,
    pub cache_dir: PathBuf,
    pub state_dir: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matching_algorithm: MatchingAlgorithm::Normal,
            num_results: 0,
            history: None,
            history_file: None,
            require_match: true,
            auto_accept_single: false,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            cache: true,
            cache_dir: app_cache_dir(),
            state_dir: app_state_dir(),
            log_level: LevelFilter::Warn,
        }
    }
}

type OptionParser = fn(&mut Config, &str) -> Result<(), String>;

const OPTIONS: &[(&str, OptionParser)] = &[
    ("matching-algorithm", set_matching_algorithm),
    ("num-results", set_num_results),
    ("history", set_history),
    ("history-file", set_history_file),
    ("require-match", set_require_match),
    ("auto-accept-single", set_auto_accept_single),
    ("max-query-length", set_max_query_length),
    ("cache", set_cache),
    ("cache-dir", set_cache_dir),
    ("state-dir", set_state_dir),
    ("log-level", set_log_level),
];

pub fn option_table() -> HashMap<&'static str, OptionParser> {
    OPTIONS.iter().copied().collect()
}

fn set_matching_algorithm(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.matching_algorithm = MatchingAlgorithm::parse(value)
        .ok_or_else(|| format!("expected normal, prefix or fuzzy, got '{value}'"))?;
    Ok(())
}

fn set_num_results(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.num_results = parse_usize(value)?;
    Ok(())
}

fn set_history(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.history = Some(parse_bool(value)?);
    Ok(())
}

fn set_history_file(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.history_file = Some(parse_path(value)?);
    Ok(())
}

fn set_require_match(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.require_match = parse_bool(value)?;
    Ok(())
}

fn set_auto_accept_single(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.auto_accept_single = parse_bool(value)?;
    Ok(())
}

fn set_max_query_length(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.max_query_length = parse_usize(value)?;
    Ok(())
}

fn set_cache(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.cache = parse_bool(value)?;
    Ok(())
}

fn set_cache_dir(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.cache_dir = parse_path(value)?;
    Ok(())
}

fn set_state_dir(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.state_dir = parse_path(value)?;
    Ok(())
}

fn set_log_level(cfg: &mut Config, value: &str) -> Result<(), String> {
    cfg.log_level = value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("expected off, error, warn, info, debug or trace, got '{value}'"))?;
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("expected true or false, got '{value}'")),
    }
}

fn parse_usize(value: &str) -> Result<usize, String> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("expected a non-negative integer, got '{value}'"))
}

fn parse_path(value: &str) -> Result<PathBuf, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("path is empty".to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Ok(home.join(rest));
        }
    }
    Ok(PathBuf::from(trimmed))
}

fn canonical_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', "-")
}

pub fn from_pairs<'a, I>(base: Config, pairs: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let table = option_table();
    let mut cfg = base;
    for (key, value) in pairs {
        let key = canonical_key(key);
        let parser = table
            .get(key.as_str())
            .ok_or_else(|| ConfigError::UnknownOption(key.clone()))?;
        parser(&mut cfg, value).map_err(|message| ConfigError::InvalidValue { key, message })?;
    }
    validate(&cfg)?;
    Ok(cfg)
}

pub fn apply_overrides(base: Config, overrides: &[String]) -> Result<Config, ConfigError> {
    let mut pairs = Vec::with_capacity(overrides.len());
    for raw in overrides {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedOverride(raw.clone()))?;
        pairs.push((key, value));
    }
    from_pairs(base, pairs)
}

pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let pairs = parse_document(&path, &raw)?;
    from_pairs(
        Config::default(),
        pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())),
    )
}

pub fn default_config_path() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join(APP_DIR_NAME);
    ["config.toml", "config.json5"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn parse_document(path: &Path, raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let is_json5 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json5") || ext.eq_ignore_ascii_case("json"));

    if is_json5 {
        let document: serde_json::Map<String, serde_json::Value> =
            json5::from_str(raw).map_err(|error| parse_error(error.to_string()))?;
        document
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(text) => text,
                    serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
                    _ => return Err(parse_error(format!("option '{key}' must be a scalar"))),
                };
                Ok((key, text))
            })
            .collect()
    } else {
        let document: toml::Table = raw
            .parse()
            .map_err(|error: toml::de::Error| parse_error(error.to_string()))?;
        document
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    toml::Value::String(text) => text,
                    toml::Value::Boolean(_) | toml::Value::Integer(_) => value.to_string(),
                    _ => return Err(parse_error(format!("option '{key}' must be a scalar"))),
                };
                Ok((key, text))
            })
            .collect()
    }
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.max_query_length == 0 || cfg.max_query_length > MAX_QUERY_LENGTH_CEILING {
        return Err(ConfigError::Invalid(format!(
            "max-query-length must be between 1 and {MAX_QUERY_LENGTH_CEILING}"
        )));
    }
    if cfg.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("cache-dir is required".into()));
    }
    if cfg.state_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("state-dir is required".into()));
    }
    Ok(())
}

pub fn app_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn app_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}
