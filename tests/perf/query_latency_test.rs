use std::time::Instant;

use crate::candidate_store::CandidateStore;
use crate::matching::MatchingAlgorithm;
use crate::model::Candidate;
use crate::query::QueryPattern;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn document_store() -> CandidateStore {
    let mut store: CandidateStore = (0..10_000)
        .map(|i| {
            let name = format!("Document_{i:05}.txt");
            Candidate::new(&i.to_string(), &name, "")
        })
        .collect();
    store.add("q4", "Q4_Report.xlsx", "spreadsheet");
    store.sort();
    store
}

#[test]
fn fuzzy_keystroke_refilter_p95_under_budget() {
    let mut store = document_store();

    let refilter = |store: &mut CandidateStore| {
        let pattern = QueryPattern::parse("q4 reort");
        store.filter(&pattern, MatchingAlgorithm::Fuzzy)
    };

    let warm = refilter(&mut store);
    assert_eq!(warm.len(), 1);
    assert_eq!(store.get(warm[0].index).map(|c| c.id.as_str()), Some("q4"));

    for _ in 0..10 {
        let _ = refilter(&mut store);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(20);
        for _ in 0..20 {
            let start = Instant::now();
            let _ = refilter(&mut store);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    // Unoptimised test builds are several times slower than release.
    assert!(
        median_p95 <= 250.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 250.0ms); batches={batch_p95:?}",
    );
}
