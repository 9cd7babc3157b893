//! Deploy, destroy and purge-retained against an in-memory backend.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use stackcraft_cli::application::ports::ApplyAction;
use stackcraft_cli::application::services::deploy::deploy;
use stackcraft_cli::application::services::destroy::{destroy, purge_retained};
use stackcraft_common::{LogicalId, ResourceKind};

use crate::helpers::{compose_ok, https_config};
use crate::mocks::{BackendCall, InMemoryBackend, RecordingReporter};

const STACK: &str = "devops-demo";

fn id(kind: ResourceKind, name: &str) -> LogicalId {
    LogicalId::new(kind, name)
}

#[tokio::test]
async fn first_deploy_creates_everything_in_graph_order() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    let graph = compose_ok(&https_config());

    let outcome = deploy(&backend, &reporter, &graph).await.unwrap();

    assert_eq!(outcome.count(ApplyAction::Created), graph.len());
    let applied: Vec<&LogicalId> = outcome.applied.iter().map(|a| &a.id).collect();
    let declared: Vec<&LogicalId> = graph.resources.iter().map(|r| &r.id).collect();
    assert_eq!(applied, declared);
    assert!(outcome.removed.is_empty());
    assert!(
        reporter
            .last_success()
            .unwrap()
            .contains(&format!("{} created", graph.len()))
    );
}

#[tokio::test]
async fn references_resolve_to_physical_ids_of_earlier_resources() {
    let backend = InMemoryBackend::default();
    let graph = compose_ok(&https_config());
    deploy(&backend, &RecordingReporter::default(), &graph)
        .await
        .unwrap();

    let resolved = backend.resolved.lock().unwrap();
    let listener = &resolved[&id(ResourceKind::Listener, "devops-demo-lb-https")];
    assert_eq!(
        listener[&id(ResourceKind::LoadBalancer, "devops-demo-lb")],
        "phys:load-balancer/devops-demo-lb"
    );
    assert_eq!(
        listener[&id(ResourceKind::TargetGroup, "devops-demo-tg")],
        "phys:target-group/devops-demo-tg"
    );
    assert!(resolved[&id(ResourceKind::Network, STACK)].is_empty());
}

#[tokio::test]
async fn redeploying_the_same_graph_changes_nothing() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    let graph = compose_ok(&https_config());
    deploy(&backend, &reporter, &graph).await.unwrap();

    let outcome = deploy(&backend, &reporter, &graph).await.unwrap();

    assert_eq!(outcome.count(ApplyAction::Unchanged), graph.len());
    assert_eq!(outcome.count(ApplyAction::Created), 0);
}

#[tokio::test]
async fn new_image_tag_updates_only_the_workload() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    deploy(&backend, &reporter, &compose_ok(&https_config()))
        .await
        .unwrap();

    let mut config = https_config();
    config.workload.image_tag = "v2".to_string();
    let outcome = deploy(&backend, &reporter, &compose_ok(&config))
        .await
        .unwrap();

    let updated: Vec<&str> = outcome
        .applied
        .iter()
        .filter(|a| a.action == ApplyAction::Updated)
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(updated, ["workload/web"]);
}

#[tokio::test]
async fn renamed_cluster_removes_the_old_one() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    deploy(&backend, &reporter, &compose_ok(&https_config()))
        .await
        .unwrap();

    let mut config = https_config();
    config.cluster.name = "devops-demo-v2".to_string();
    let outcome = deploy(&backend, &reporter, &compose_ok(&config))
        .await
        .unwrap();

    assert_eq!(outcome.removed, vec![id(ResourceKind::ComputeCluster, STACK)]);
    assert!(outcome.orphaned.is_empty());
    assert!(
        !backend
            .deployed_ids(STACK)
            .contains(&id(ResourceKind::ComputeCluster, STACK))
    );
}

#[tokio::test]
async fn renamed_registry_leaves_the_old_one_in_place() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    deploy(&backend, &reporter, &compose_ok(&https_config()))
        .await
        .unwrap();

    let mut config = https_config();
    config.registry.name = "devops-demo-images".to_string();
    let outcome = deploy(&backend, &reporter, &compose_ok(&config))
        .await
        .unwrap();

    let old = id(ResourceKind::ImageRegistry, STACK);
    assert_eq!(outcome.orphaned, vec![old.clone()]);
    assert!(backend.deployed_ids(STACK).contains(&old));
    assert!(!backend.calls().contains(&BackendCall::Delete(old)));
    assert_eq!(reporter.warnings().len(), 1);
}

#[tokio::test]
async fn failure_stops_at_the_failing_resource() {
    let service = id(ResourceKind::Service, "web");
    let backend = InMemoryBackend::failing_on(service.clone());
    let graph = compose_ok(&https_config());

    let err = deploy(&backend, &RecordingReporter::default(), &graph)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("service/web"), "{err:#}");
    let calls = backend.calls();
    assert_eq!(calls.last(), Some(&BackendCall::Upsert(service)));
    let position = graph.position(&id(ResourceKind::Service, "web")).unwrap();
    assert_eq!(calls.len(), position + 1);
}

#[tokio::test]
async fn destroy_keeps_retained_resources_and_deletes_in_reverse() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    let graph = compose_ok(&https_config());
    deploy(&backend, &reporter, &graph).await.unwrap();

    let outcome = destroy(&backend, &reporter, STACK).await.unwrap();

    let expected_deleted: Vec<LogicalId> = graph
        .resources
        .iter()
        .rev()
        .filter(|r| !r.is_retained())
        .map(|r| r.id.clone())
        .collect();
    assert_eq!(outcome.deleted, expected_deleted);
    assert_eq!(
        outcome.retained,
        vec![
            id(ResourceKind::AccessGrant, "devops-demo-deployer-policy"),
            id(ResourceKind::DeployPrincipal, "devops-demo-deployer"),
            id(ResourceKind::ImageRegistry, STACK),
        ]
    );
    assert_eq!(backend.deployed_ids(STACK).len(), 3);
}

#[tokio::test]
async fn purge_retained_refuses_while_the_stack_is_live() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    deploy(&backend, &reporter, &compose_ok(&https_config()))
        .await
        .unwrap();

    let err = purge_retained(&backend, &reporter, STACK).await.unwrap_err();

    assert!(err.to_string().contains("run destroy first"), "{err}");
    assert!(
        !backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::Delete(_)))
    );
}

#[tokio::test]
async fn purge_retained_after_destroy_empties_the_stack() {
    let backend = InMemoryBackend::default();
    let reporter = RecordingReporter::default();
    deploy(&backend, &reporter, &compose_ok(&https_config()))
        .await
        .unwrap();
    destroy(&backend, &reporter, STACK).await.unwrap();

    let purged = purge_retained(&backend, &reporter, STACK).await.unwrap();

    assert_eq!(purged.len(), 3);
    assert!(backend.deployed_ids(STACK).is_empty());
}

#[tokio::test]
async fn destroying_an_unknown_stack_is_a_no_op() {
    let backend = InMemoryBackend::default();
    let outcome = destroy(&backend, &RecordingReporter::default(), "never-deployed")
        .await
        .unwrap();
    assert!(outcome.deleted.is_empty());
    assert!(outcome.retained.is_empty());
}
