use std::path::PathBuf;

use crate::cache::{self, CacheError};
use crate::candidate_store::CandidateStore;
use crate::config::{validate, Config, ConfigError};
use crate::discovery::{self, DiscoveryProvider, ProviderError};
use crate::history::{History, HistoryError};
use crate::session::{KeyAction, Selection, Session, SessionEvent, SessionOptions};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    Run,
    Drun,
    Dmenu,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Drun => "drun",
            Self::Dmenu => "dmenu",
        }
    }

    fn history_by_default(self) -> bool {
        !matches!(self, Self::Dmenu)
    }

    fn cacheable(self) -> bool {
        !matches!(self, Self::Dmenu)
    }
}

pub fn history_enabled(config: &Config, mode: Mode) -> bool {
    config.history.unwrap_or_else(|| mode.history_by_default())
}

pub fn history_path(config: &Config, mode: Mode) -> PathBuf {
    config
        .history_file
        .clone()
        .unwrap_or_else(|| config.state_dir.join(format!("{}-history", mode.as_str())))
}

pub fn cache_path(config: &Config, mode: Mode) -> PathBuf {
    config.cache_dir.join(mode.as_str())
}

pub fn load_store(
    config: &Config,
    mode: Mode,
    provider: &dyn DiscoveryProvider,
) -> Result<CandidateStore, ServiceError> {
    let use_cache = config.cache && mode.cacheable();
    let path = cache_path(config, mode);

    if use_cache && cache::is_fresh(&path, &provider.source_dirs()) {
        if let Some(mut store) = cache::load(&path)? {
            if !store.is_sorted() {
                store.sort();
            }
            log::info!("{}: loaded {} candidates from cache", mode.as_str(), store.len());
            return Ok(store);
        }
    }

    let store = discovery::build_store(provider)?;
    if use_cache {
        if let Err(error) = cache::save(&path, &store) {
            log::warn!("{}: {error}", mode.as_str());
        }
    }
    Ok(store)
}

pub struct Launcher {
    config: Config,
    mode: Mode,
    session: Session,
    history: Option<History>,
    history_path: Option<PathBuf>,
}

impl Launcher {
    pub fn new(config: Config, mode: Mode, store: CandidateStore) -> Result<Self, ServiceError> {
        validate(&config)?;
        if !history_enabled(&config, mode) {
            return Ok(Self::assemble(config, mode, store, None, None));
        }

        let path = history_path(&config, mode);
        let history = History::load(&path)?;
        log::info!("history: {} entries from {}", history.len(), path.display());
        Ok(Self::assemble(config, mode, store, Some(history), Some(path)))
    }

    pub fn with_history(
        config: Config,
        mode: Mode,
        store: CandidateStore,
        history: History,
        history_path: Option<PathBuf>,
    ) -> Result<Self, ServiceError> {
        validate(&config)?;
        Ok(Self::assemble(config, mode, store, Some(history), history_path))
    }

    fn assemble(
        config: Config,
        mode: Mode,
        mut store: CandidateStore,
        history: Option<History>,
        history_path: Option<PathBuf>,
    ) -> Self {
        if let Some(history) = &history {
            store.apply_history(history);
        }
        let options = SessionOptions {
            algorithm: config.matching_algorithm,
            max_query_length: config.max_query_length,
            page_size: config.num_results,
            require_match: config.require_match,
            auto_accept_single: config.auto_accept_single,
        };
        Self {
            session: Session::new(store, options),
            config,
            mode,
            history,
            history_path,
        }
    }

    pub fn handle(&mut self, action: KeyAction) -> SessionEvent {
        self.session.handle(action)
    }

    pub fn commit(&mut self, selection: &Selection) -> Result<(), ServiceError> {
        let Selection::Candidate { name, .. } = selection else {
            return Ok(());
        };
        let Some(history) = self.history.as_mut() else {
            return Ok(());
        };

        history.add(name);
        if let Some(path) = &self.history_path {
            history.save(path)?;
        }
        self.reapply_history();
        Ok(())
    }

    pub fn forget(&mut self, name: &str) -> Result<bool, ServiceError> {
        let Some(history) = self.history.as_mut() else {
            return Ok(false);
        };
        if !history.remove(name) {
            return Ok(false);
        }
        if let Some(path) = &self.history_path {
            history.save(path)?;
        }
        self.reapply_history();
        Ok(true)
    }

    fn reapply_history(&mut self) {
        if let Some(history) = &self.history {
            self.session.update_store(|store| store.apply_history(history));
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}
