use std::cell::Cell;
use std::path::{Path, PathBuf};

use sift_core::candidate_store::CandidateStore;
use sift_core::config::Config;
use sift_core::core_service::{self, Launcher, Mode, ServiceError};
use sift_core::discovery::{DiscoveryProvider, ProviderError};
use sift_core::model::Candidate;
use sift_core::session::{KeyAction, Selection, SessionEvent};

fn test_config(dir: &Path) -> Config {
    Config {
        cache_dir: dir.join("cache"),
        state_dir: dir.join("state"),
        ..Default::default()
    }
}

fn app_store() -> CandidateStore {
    let mut store = CandidateStore::new();
    store.add("org.gnome.Nautilus.desktop", "Files", "folder");
    store.add("org.mozilla.firefox.desktop", "Firefox", "browser");
    store.sort();
    store
}

fn firefox() -> Selection {
    Selection::Candidate {
        id: "org.mozilla.firefox.desktop".to_string(),
        name: "Firefox".to_string(),
    }
}

struct CountingProvider {
    source: PathBuf,
    calls: Cell<usize>,
}

impl DiscoveryProvider for CountingProvider {
    fn provider_name(&self) -> &'static str {
        "counting"
    }

    fn discover(&self) -> Result<Vec<Candidate>, ProviderError> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![
            Candidate::new("b", "Beta", ""),
            Candidate::new("a", "Alpha", "first"),
        ])
    }

    fn source_dirs(&self) -> Vec<PathBuf> {
        vec![self.source.clone()]
    }
}

#[test]
fn commit_records_history_and_reranks() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let mut launcher = Launcher::new(config.clone(), Mode::Drun, app_store()).unwrap();

    let first = launcher.session().results().next().unwrap();
    assert_eq!(first.name, "Files");

    launcher.commit(&firefox()).unwrap();

    let path = core_service::history_path(&config, Mode::Drun);
    assert_eq!(path, dir.path().join("state").join("drun-history"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 Firefox\n");

    let first = launcher.session().results().next().unwrap();
    assert_eq!(first.name, "Firefox");
    assert_eq!(first.history_score, 1);

    let reloaded = Launcher::new(config, Mode::Drun, app_store()).unwrap();
    assert_eq!(reloaded.history().unwrap().find("Firefox").unwrap().run_count, 1);
}

#[test]
fn free_text_selection_is_not_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let mut launcher = Launcher::new(config.clone(), Mode::Run, app_store()).unwrap();

    launcher.commit(&Selection::Text("xterm -e top".to_string())).unwrap();

    assert!(launcher.history().unwrap().is_empty());
    assert!(!core_service::history_path(&config, Mode::Run).exists());
}

#[test]
fn dmenu_keeps_no_history_unless_asked() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let mut launcher = Launcher::new(config.clone(), Mode::Dmenu, app_store()).unwrap();
    assert!(launcher.history().is_none());
    launcher.commit(&firefox()).unwrap();
    assert!(!dir.path().join("state").exists());

    let history_file = dir.path().join("picks");
    let config = Config {
        history: Some(true),
        history_file: Some(history_file.clone()),
        ..config
    };
    let mut launcher = Launcher::new(config, Mode::Dmenu, app_store()).unwrap();
    launcher.commit(&firefox()).unwrap();
    assert_eq!(std::fs::read_to_string(history_file).unwrap(), "1 Firefox\n");
}

#[test]
fn forget_removes_entry_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let path = core_service::history_path(&config, Mode::Drun);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "3 Firefox\n1 Files\n").unwrap();

    let mut launcher = Launcher::new(config, Mode::Drun, app_store()).unwrap();
    assert!(launcher.forget("Firefox").unwrap());
    assert!(!launcher.forget("Firefox").unwrap());

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 Files\n");
    let first = launcher.session().results().next().unwrap();
    assert_eq!(first.name, "Files");
}

#[test]
fn submitted_keystrokes_flow_through_launcher() {
    let dir = tempfile::tempdir().unwrap();
    let mut launcher = Launcher::new(test_config(dir.path()), Mode::Drun, app_store()).unwrap();

    for ch in "fire".chars() {
        assert_eq!(launcher.handle(KeyAction::Insert(ch)), SessionEvent::Continue);
    }
    assert_eq!(launcher.handle(KeyAction::Submit), SessionEvent::Submit(firefox()));
}

#[test]
fn rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        max_query_length: 0,
        ..test_config(dir.path())
    };
    let result = Launcher::new(config, Mode::Drun, app_store());
    assert!(matches!(result, Err(ServiceError::Config(_))));
}

#[test]
fn load_store_reuses_fresh_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = dir.path().join("applications");
    std::fs::create_dir_all(&source).unwrap();
    let provider = CountingProvider {
        source: source.clone(),
        calls: Cell::new(0),
    };

    let built = core_service::load_store(&config, Mode::Drun, &provider).unwrap();
    let cached = core_service::load_store(&config, Mode::Drun, &provider).unwrap();

    assert_eq!(provider.calls.get(), 1);
    assert_eq!(built, cached);
    assert_eq!(cached.get(0).unwrap().name, "Alpha");
    assert!(core_service::cache_path(&config, Mode::Drun).is_file());

    let cache_time = std::fs::metadata(core_service::cache_path(&config, Mode::Drun))
        .unwrap()
        .modified()
        .unwrap();
    std::fs::File::open(&source)
        .unwrap()
        .set_modified(cache_time + std::time::Duration::from_secs(60))
        .unwrap();
    core_service::load_store(&config, Mode::Drun, &provider).unwrap();
    assert_eq!(provider.calls.get(), 2);
}

#[test]
fn load_store_skips_cache_when_disabled_or_dmenu() {
    let dir = tempfile::tempdir().unwrap();
    let provider = CountingProvider {
        source: dir.path().to_path_buf(),
        calls: Cell::new(0),
    };

    let config = test_config(dir.path());
    core_service::load_store(&config, Mode::Dmenu, &provider).unwrap();
    core_service::load_store(&config, Mode::Dmenu, &provider).unwrap();
    assert!(!core_service::cache_path(&config, Mode::Dmenu).exists());

    let config = Config {
        cache: false,
        ..config
    };
    core_service::load_store(&config, Mode::Run, &provider).unwrap();
    assert!(!core_service::cache_path(&config, Mode::Run).exists());
    assert_eq!(provider.calls.get(), 3);
}
