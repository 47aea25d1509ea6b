//! End-to-end tests of the iterated local search driver.

use std::sync::OnceLock;

use rstest::rstest;

use netmcs_align::{AlignConfig, AlignError, IteratedLocalSearch};
use netmcs_common::Network;

fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn cycle4(name: &str) -> Network {
    let mut net = Network::new(name);
    net.add_edge_by_name("a", "b");
    net.add_edge_by_name("b", "c");
    net.add_edge_by_name("c", "d");
    net.add_edge_by_name("d", "a");
    net
}

fn triangle(name: &str) -> Network {
    let mut net = Network::new(name);
    net.add_edge_by_name("x", "y");
    net.add_edge_by_name("y", "z");
    net.add_edge_by_name("x", "z");
    net
}

fn table(aligner: &mut IteratedLocalSearch) -> String {
    let mut out = Vec::new();
    aligner
        .alignment()
        .write_table(&mut out)
        .expect("write alignment table");
    String::from_utf8(out).expect("utf8 table")
}

#[test]
fn rejects_fewer_than_two_networks() {
    assert!(matches!(
        IteratedLocalSearch::new(vec![cycle4("only")], AlignConfig::default()),
        Err(AlignError::TooFewNetworks { found: 1 })
    ));
}

#[test]
fn identical_cycles_start_fully_conserved() {
    init_test_logger();
    let networks = vec![cycle4("a"), cycle4("b")];
    let mut aligner =
        IteratedLocalSearch::new(networks, AlignConfig::default().with_seed(7)).expect("construct");

    // Matching insertion order and degrees give an identity alignment.
    assert_eq!(aligner.best_quality(), 4);
    assert_eq!(aligner.current_quality(), 4);

    aligner.run(5, 50);
    assert!(aligner.best_quality() >= 4, "run can never lose the best");
}

#[test]
fn unequal_networks_are_padded_to_common_size() {
    init_test_logger();
    let networks = vec![cycle4("big"), triangle("small")];
    let mut aligner =
        IteratedLocalSearch::new(networks, AlignConfig::default().with_seed(11)).expect("construct");

    assert_eq!(aligner.size(), 4);
    for network in aligner.networks() {
        assert_eq!(network.vertex_count(), 4);
    }
    let padded = &aligner.networks()[1];
    let placeholders: Vec<_> = (0..padded.vertex_count())
        .filter(|&id| padded.vertex(id).is_placeholder())
        .collect();
    assert_eq!(placeholders.len(), 1);
    assert_eq!(padded.degree(placeholders[0]), 0);
    assert_eq!(padded.edge_count(), 3);

    aligner.run(3, 20);
    let rendered = table(&mut aligner);
    assert!(!rendered.contains("$pad$"), "placeholders must not be shown");
}

#[test]
fn best_quality_is_monotonic_across_steps() {
    let networks = vec![cycle4("a"), cycle4("b"), cycle4("c")];
    let mut aligner =
        IteratedLocalSearch::new(networks, AlignConfig::default().with_seed(3)).expect("construct");

    let mut previous = aligner.best_quality();
    for _ in 0..8 {
        let improved = aligner.step();
        let best = aligner.best_quality();
        assert!(best >= previous);
        if improved {
            assert!(best > previous);
        }
        previous = best;
    }
}

#[rstest]
#[case(0, 100)]
#[case(100, 0)]
fn zero_budget_runs_no_steps(#[case] max_nonimproving: usize, #[case] max_steps: usize) {
    let networks = vec![cycle4("a"), triangle("b")];
    let mut aligner =
        IteratedLocalSearch::new(networks, AlignConfig::default().with_seed(5)).expect("construct");
    let initial = aligner.best_quality();

    aligner.run(max_nonimproving, max_steps);
    assert_eq!(aligner.best_quality(), initial);
    assert_eq!(aligner.current_quality(), initial);
}

#[test]
fn alignment_is_idempotent() {
    let networks = vec![cycle4("a"), cycle4("b")];
    let mut aligner =
        IteratedLocalSearch::new(networks, AlignConfig::default().with_seed(13)).expect("construct");
    aligner.run(4, 25);

    let first = table(&mut aligner);
    let second = table(&mut aligner);
    assert_eq!(first, second);
}

#[test]
fn seeded_runs_are_reproducible() {
    let build = || {
        IteratedLocalSearch::new(
            vec![cycle4("a"), triangle("b")],
            AlignConfig::new(0.3).with_seed(42),
        )
        .expect("construct")
    };
    let mut left = build();
    let mut right = build();
    left.run(6, 40);
    right.run(6, 40);

    assert_eq!(left.best_quality(), right.best_quality());
    assert_eq!(table(&mut left), table(&mut right));
}

#[test]
fn conserved_network_from_full_run() {
    init_test_logger();
    let networks = vec![cycle4("a"), cycle4("b")];
    let mut aligner =
        IteratedLocalSearch::new(networks, AlignConfig::default().with_seed(1)).expect("construct");
    aligner.run(3, 20);

    let alignment = aligner.alignment();
    let conserved = alignment.conserved_network(&netmcs_align::SubgraphOptions::default());
    // Everything is conserved between identical networks.
    assert_eq!(conserved.edge_count(), 4);
    assert_eq!(conserved.vertex_count(), 4);
}
