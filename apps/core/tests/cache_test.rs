use std::path::PathBuf;

use proptest::prelude::*;

use sift_core::cache;
use sift_core::candidate_store::CandidateStore;
use sift_core::model::Candidate;

fn sample_store() -> CandidateStore {
    let mut store = CandidateStore::new();
    store.push(Candidate::new("org.mozilla.firefox.desktop", "Firefox", "browser web").with_path("/usr/share/applications/org.mozilla.firefox.desktop"));
    store.push(Candidate::new("foot.desktop", "Foot", "terminal"));
    store.sort();
    store
}

#[test]
fn save_then_load_reproduces_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("drun");
    let store = sample_store();

    cache::save(&path, &store).unwrap();
    let loaded = cache::load(&path).unwrap().unwrap();

    assert_eq!(loaded, store);
}

#[test]
fn load_missing_cache_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(cache::load(&dir.path().join("run")).unwrap().is_none());
}

#[test]
fn freshness_compares_against_source_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("bin");
    std::fs::create_dir_all(&source).unwrap();
    let cache_path = dir.path().join("run");

    assert!(!cache::is_fresh(&cache_path, &[source.clone()]));

    cache::save(&cache_path, &sample_store()).unwrap();
    let missing: PathBuf = dir.path().join("not-there");
    assert!(cache::is_fresh(&cache_path, &[source.clone(), missing]));

    let cache_time = std::fs::metadata(&cache_path).unwrap().modified().unwrap();
    let later = cache_time + std::time::Duration::from_secs(60);
    std::fs::File::open(&source).unwrap().set_modified(later).unwrap();
    assert!(!cache::is_fresh(&cache_path, &[source]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_encode_decode_preserves_records_in_order(
        records in proptest::collection::vec(
            ("[a-z.]{1,10}", "[A-Za-z0-9 ]{0,12}", "[a-z/]{0,12}", "[a-z ;]{0,12}"),
            0..10,
        ),
    ) {
        let store: CandidateStore = records
            .iter()
            .map(|(id, name, path, keywords)| Candidate::new(id, name, keywords).with_path(path))
            .collect();

        prop_assert_eq!(cache::decode(&cache::encode(&store)), store);
    }
}
