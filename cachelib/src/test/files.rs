use std::fs;

use tempfile::tempdir;

use crate::config::{ReplacementPolicyConfig, SimulationConfig, DEFAULT_CAPACITY, DEFAULT_RECONCILE_INTERVAL};
use crate::error::SimError;
use crate::relabel::relabel_directory;
use crate::trace::{TraceSource, TRACE_FIELD_COUNT};
use crate::util::{csv_files, expand_trace_paths};

#[test]
fn config_applies_defaults_and_aliases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "caches": [ { "name": "small", "policy": "lfu", "capacity": 16 }, { "name": "big", "policy": "lru" } ] }"#,
    )
    .unwrap();
    let config = SimulationConfig::from_path(&path).unwrap();
    assert_eq!(config.caches.len(), 2);
    assert_eq!(config.caches[0].policy, ReplacementPolicyConfig::FrequentRead);
    assert_eq!(config.caches[0].capacity, 16);
    assert_eq!(config.caches[0].reconcile_interval, DEFAULT_RECONCILE_INTERVAL);
    assert_eq!(config.caches[1].policy, ReplacementPolicyConfig::LeastRecentlyUsed);
    assert_eq!(config.caches[1].capacity, DEFAULT_CAPACITY);
    assert_eq!(config.latency.miss_cost, 300.0);
}

#[test]
fn empty_config_object_is_the_default() {
    let config: SimulationConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, SimulationConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation_rejects_unusable_values() {
    let mut config = SimulationConfig::default().with_reconcile_interval(0);
    assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

    config = SimulationConfig::default();
    config.latency.miss_cost = f64::NAN;
    assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

    config = SimulationConfig::default();
    config.latency.hit_cost = -1.0;
    assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

    config = SimulationConfig::default();
    config.caches.clear();
    assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
}

#[test]
fn malformed_config_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "caches": [ { "name": "x", "policy": "fifo" } ] }"#).unwrap();
    assert!(matches!(SimulationConfig::from_path(&path), Err(SimError::Config(_))));
    assert!(matches!(
        SimulationConfig::from_path(dir.path().join("missing.json")),
        Err(SimError::Io { .. })
    ));
}

#[test]
fn relabel_appends_label_to_every_csv_line() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("hm_0.csv"),
        "128166372003061629,hm,0,Read,9933824,4096,101\r\n128166372016382155,hm,0,Write,2942976,4096,111\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a trace\n").unwrap();

    let reports = relabel_directory(dir.path(), "0").unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].lines, 2);
    assert_eq!(reports[0].output, dir.path().join("hm_0.csv_out"));

    let relabelled = fs::read_to_string(dir.path().join("hm_0.csv_out")).unwrap();
    assert_eq!(
        relabelled,
        "128166372003061629,hm,0,Read,9933824,4096,101,0\n128166372016382155,hm,0,Write,2942976,4096,111,0\n"
    );
    assert!(!dir.path().join("notes.txt_out").exists());

    // The output is exactly what the simulator expects
    let source = TraceSource::open(dir.path().join("hm_0.csv_out"), TRACE_FIELD_COUNT).unwrap();
    assert_eq!(source.records().len(), 2);
    assert_eq!(source.skipped(), 0);
}

#[test]
fn relabel_missing_directory_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        relabel_directory(&dir.path().join("nope"), "0"),
        Err(SimError::Io { .. })
    ));
}

#[test]
fn directories_expand_to_sorted_csv_files() {
    let dir = tempdir().unwrap();
    for name in ["b.csv", "a.csv", "a.csv_out", "c.json"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    fs::create_dir(dir.path().join("nested.csv")).unwrap();
    let files = csv_files(dir.path()).unwrap();
    assert_eq!(files, vec![dir.path().join("a.csv"), dir.path().join("b.csv")]);

    let single = dir.path().join("c.json");
    let expanded = expand_trace_paths(&[single.clone(), dir.path().to_path_buf()]).unwrap();
    assert_eq!(expanded, vec![single, dir.path().join("a.csv"), dir.path().join("b.csv")]);
}

#[test]
fn opening_a_missing_trace_fails() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        TraceSource::open(dir.path().join("missing"), TRACE_FIELD_COUNT),
        Err(SimError::Io { .. })
    ));
}

#[test]
fn opening_an_empty_trace_yields_no_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").unwrap();
    let source = TraceSource::open(&path, TRACE_FIELD_COUNT).unwrap();
    assert!(source.records().is_empty());
}
