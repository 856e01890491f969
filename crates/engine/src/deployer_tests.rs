// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{deployment, previous_record, Harness};
use baton_adapters::{ContainerStatus, OutcomeStatus, RecordingReporter};

fn deployer(h: &Harness, reporter: &RecordingReporter) -> Deployer {
    Deployer::new(h.context()).unwrap().with_reporter(reporter.clone())
}

#[tokio::test]
async fn deploy_assigns_deployment_id_when_absent() {
    let h = Harness::new();
    let reporter = RecordingReporter::new();
    let d = Deployment::new("web", "nginx:1.27", 80).with_domain("web.example.com");

    let record = deployer(&h, &reporter).deploy(d).await.unwrap();

    let id = record.deployment_id.clone().unwrap();
    assert!(id.as_str().starts_with(DeploymentId::PREFIX));
    assert_eq!(record.container_name, format!("web-{}", id));
    assert_eq!(reporter.outcomes()[0].deployment_id, id);
}

#[tokio::test]
async fn success_is_reported_with_serving_port() {
    let h = Harness::new().with_previous(previous_record("web", "dep-old", 10005));
    let reporter = RecordingReporter::new();

    deployer(&h, &reporter).deploy(deployment("web", "dep-new")).await.unwrap();

    assert_eq!(
        reporter.outcomes(),
        vec![Outcome::succeeded(DeploymentId::from("dep-new"), "web", 10000)]
    );
}

#[tokio::test(start_paused = true)]
async fn failure_is_reported_with_tag() {
    let h = Harness::new();
    h.runtime.set_fallback_status(ContainerStatus { state: "exited".to_string(), health: None });
    let reporter = RecordingReporter::new();

    let err = deployer(&h, &reporter).deploy(deployment("web", "dep-1")).await.unwrap_err();

    assert!(matches!(err, DeployError::HealthCheck { .. }));
    let outcomes = reporter.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, OutcomeStatus::Failed);
    assert_eq!(outcomes[0].error_tag.as_deref(), Some("health-check-failed"));
    assert_eq!(outcomes[0].error, Some(err.to_string()));
}

#[tokio::test]
async fn invalid_deployment_touches_nothing() {
    let h = Harness::new();
    let reporter = RecordingReporter::new();
    let d = Deployment::new("Web App", "nginx:1.27", 80);

    let err = deployer(&h, &reporter).deploy(d).await.unwrap_err();

    assert_eq!(err.tag(), "invalid-deployment");
    assert!(h.ports.allocated().is_empty());
    assert!(h.runtime.calls().is_empty());
    assert_eq!(reporter.outcomes()[0].error_tag.as_deref(), Some("invalid-deployment"));
}

#[tokio::test]
async fn report_failure_does_not_fail_rollout() {
    let h = Harness::new();
    let reporter = RecordingReporter::new();
    reporter.fail(true);

    let record = deployer(&h, &reporter).deploy(deployment("web", "dep-1")).await.unwrap();

    assert_eq!(h.store.record("web"), Some(record));
}

#[tokio::test]
async fn default_reporter_only_logs() {
    let h = Harness::new();
    let deployer = Deployer::new(h.context()).unwrap();

    let record = deployer.deploy(deployment("web", "dep-1")).await.unwrap();
    assert_eq!(record.port, 10000);
}

#[tokio::test(start_paused = true)]
async fn same_app_rollouts_run_one_after_another() {
    let h = Harness::new();
    // The first rollout needs three polls; the second would see no previous
    // deployment if it did not wait.
    h.runtime.script_statuses([
        ContainerStatus { state: "running".to_string(), health: Some("starting".to_string()) },
        ContainerStatus { state: "running".to_string(), health: Some("starting".to_string()) },
    ]);
    let reporter = RecordingReporter::new();
    let deployer = deployer(&h, &reporter);

    let (first, second) = tokio::join!(
        deployer.deploy(deployment("web", "dep-1")),
        deployer.deploy(deployment("web", "dep-2")),
    );

    assert_eq!(first.unwrap().port, 10000);
    let second = second.unwrap();
    assert_eq!(second.container_name, "web-dep-2");
    assert_eq!(h.store.record("web"), Some(second));
    assert_eq!(h.runtime.containers(), vec!["web-dep-2"]);
    assert_eq!(h.ports.held(), vec![10001]);
    assert_eq!(h.ports.released(), vec![10000]);
    assert!(deployer.app_locks.lock().is_empty());
}

#[test]
fn app_locks_are_per_application() {
    let deployer = Deployer::new(Harness::new().context()).unwrap();

    assert!(Arc::ptr_eq(&deployer.app_lock("web"), &deployer.app_lock("web")));
    assert!(!Arc::ptr_eq(&deployer.app_lock("web"), &deployer.app_lock("api")));
}

#[tokio::test]
async fn finished_rollouts_release_their_app_lock() {
    let h = Harness::new();
    let reporter = RecordingReporter::new();
    let deployer = deployer(&h, &reporter);

    deployer.deploy(deployment("web", "dep-1")).await.unwrap();
    h.runtime.fail_start("manifest unknown");
    deployer.deploy(deployment("api", "dep-2")).await.unwrap_err();

    assert!(deployer.app_locks.lock().is_empty());
}

#[test]
fn held_app_lock_is_not_pruned() {
    let deployer = Deployer::new(Harness::new().context()).unwrap();
    let lock = deployer.app_lock("web");

    deployer.prune_app_lock("web");
    assert!(Arc::ptr_eq(&lock, &deployer.app_lock("web")));

    drop(lock);
    deployer.prune_app_lock("web");
    assert!(deployer.app_locks.lock().is_empty());
}
