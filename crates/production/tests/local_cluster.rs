//! End-to-end runs of the in-process cluster on wall-clock time.

use synod_production::{ClusterConfig, LocalCluster, ProtocolConfig, RunnerError};
use synod_types::{Directory, ProcessId};
use tracing_test::traced_test;

fn short_config(nodes: usize, faulty: usize, crash_probability: f64, seed: u64) -> ClusterConfig {
    ClusterConfig {
        nodes,
        faulty,
        decision_window_ms: 300,
        observation_window_ms: 300,
        seed: Some(seed),
        protocol: ProtocolConfig {
            crash_probability,
            ..Default::default()
        },
    }
}

#[traced_test]
#[tokio::test]
async fn test_cluster_reaches_agreement() {
    let cluster = LocalCluster::spawn(short_config(3, 1, 0.2, 11)).expect("valid config");
    let report = cluster.run_experiment().await.expect("run");

    assert!(report.agreement());
    assert!(!report.decisions.is_empty());
    assert!(!report.crashed.contains(&report.leader));

    // A node decides once at most.
    let mut deciders: Vec<ProcessId> = report.decisions.iter().map(|d| d.node).collect();
    deciders.sort();
    deciders.dedup();
    assert_eq!(deciders.len(), report.decisions.len());
}

#[traced_test]
#[tokio::test]
async fn test_certain_crash_silences_faulty_nodes() {
    let cluster = LocalCluster::spawn(short_config(5, 2, 1.0, 3)).expect("valid config");
    let report = cluster.run_experiment().await.expect("run");

    assert_eq!(report.crashed.len(), 2);
    let mut silent = report.silent.clone();
    let mut crashed = report.crashed.clone();
    silent.sort();
    crashed.sort();
    assert_eq!(silent, crashed);

    assert_eq!(report.decisions.len(), 3);
    assert!(report.agreement());
    assert!(report.decisions.iter().all(|d| !crashed.contains(&d.node)));
}

#[tokio::test]
async fn test_spawn_rejects_faulty_majority() {
    let result = LocalCluster::spawn(short_config(4, 2, 0.0, 1));
    assert!(matches!(result, Err(RunnerError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_mailboxes_form_a_valid_directory() {
    let cluster = LocalCluster::spawn(short_config(5, 2, 0.0, 9)).expect("valid config");
    let directory = Directory::new(cluster.mailboxes().ids().collect()).expect("slot order");
    assert_eq!(directory.len(), 5);
    assert!(directory.contains(ProcessId(5)));

    let (states, decisions) = cluster.shutdown().await.expect("shutdown");
    assert_eq!(states.len(), 5);
    assert!(decisions.is_empty());
}
