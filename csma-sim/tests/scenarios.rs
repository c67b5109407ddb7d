use csma_sim::{Scenario, build_network, run, write_timeline};
use std::path::PathBuf;

fn bundled(name: &str) -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name);
    Scenario::load(path).unwrap()
}

#[test]
fn bundled_scenarios_run() {
    for (name, domains, transmitters, access_points) in [
        ("two_stations.toml", 1, 2, 1),
        ("two_domains.toml", 2, 4, 2),
    ] {
        let scenario = bundled(name);
        let seed = scenario.seed.unwrap();

        let (network, _) = build_network(&scenario, seed).unwrap();
        assert_eq!(network.collision_domains().count(), domains, "{name}");

        let outcome = run(&scenario, seed).unwrap();
        assert_eq!(outcome.report.transmitters().count(), transmitters, "{name}");
        assert_eq!(outcome.report.access_points().count(), access_points, "{name}");
        assert!(outcome.report.total_successes() > 0, "{name}");
        assert!(outcome.report.final_slot >= network.slot_budget(), "{name}");
        assert!(outcome.summary.fairness > 0.0 && outcome.summary.fairness <= 1.0);
    }
}

#[test]
fn single_access_point_acknowledges_every_success() {
    let scenario = bundled("two_stations.toml");
    let outcome = run(&scenario, 11).unwrap();

    let acknowledged: u64 = outcome.report.access_points().map(|ap| ap.successes).sum();
    assert_eq!(acknowledged, outcome.report.total_successes());
}

#[test]
fn same_seed_same_outcome() {
    let scenario = bundled("two_domains.toml");

    let first = run(&scenario, 99).unwrap();
    let second = run(&scenario, 99).unwrap();

    assert_eq!(first.report, second.report);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn explicit_arrivals() {
    let scenario: Scenario = r#"
        [[domains]]
        transmitters = [{ arrivals = [0, 1000] }, { arrivals = [0, 1000] }]
    "#
    .parse()
    .unwrap();

    let outcome = run(&scenario, 5).unwrap();

    for tx in &outcome.summary.transmitters {
        assert_eq!(tx.successes, 1);
        assert_eq!(tx.throughput_kbps, 1_200.0);
    }
    assert_eq!(outcome.summary.fairness, 1.0);
}

#[test]
fn missing_access_point_aborts() {
    let scenario: Scenario = r#"
        [[domains]]
        access_points = 0
        transmitters = [{ arrivals = [0, 1000] }]
    "#
    .parse()
    .unwrap();

    let error = run(&scenario, 0).unwrap_err();
    assert!(error.to_string().contains("Simulation aborted"));
}

#[test]
fn unsorted_arrivals_are_rejected() {
    let scenario: Scenario = r#"
        [[domains]]
        transmitters = [{ arrivals = [10, 5] }]
    "#
    .parse()
    .unwrap();

    let error = run(&scenario, 0).unwrap_err();
    assert!(error.to_string().contains("domain #0"));
}

#[test]
fn missing_file_names_the_path() {
    let error = Scenario::load("does/not/exist.toml").unwrap_err();
    assert!(error.to_string().contains("does/not/exist.toml"));
}

#[test]
fn timeline_holds_every_history_entry() {
    let outcome = run(&bundled("two_stations.toml"), 3).unwrap();

    let mut csv = Vec::new();
    write_timeline(&outcome.report, &mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();

    let entries: usize = outcome.report.nodes.iter().map(|n| n.history.len()).sum();
    assert_eq!(csv.lines().count(), entries + 1);
}
