//! Integration tests for dataset reconciliation
//!
//! These tests drive `ReconcileDatasetUseCase` against a fresh
//! `MemoryDatasetStore` per test and check both the outcome and the calls
//! that reached the store.

use std::io::Write;
use std::sync::Arc;

use brickctl_core::config::Config;
use brickctl_core::domain::{
    DatasetPath, DatasetState, DefaultProfile, FailureKind, PropertyMap, PropertyValue,
};
use brickctl_core::usecases::ReconcileDatasetUseCase;
use brickctl_store::{MemoryDatasetStore, StoreCall};

// ============================================================================
// Test helpers
// ============================================================================

fn path(s: &str) -> DatasetPath {
    DatasetPath::new(s).unwrap()
}

fn overlay(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), PropertyValue::from(*v)))
        .collect()
}

fn setup() -> (Arc<MemoryDatasetStore>, ReconcileDatasetUseCase) {
    let store = Arc::new(MemoryDatasetStore::with_pools(["p01"]));
    let usecase = ReconcileDatasetUseCase::new(store.clone(), DefaultProfile::standard());
    (store, usecase)
}

fn mutations(calls: &[StoreCall]) -> Vec<&StoreCall> {
    calls.iter().filter(|c| c.is_mutation()).collect()
}

// ============================================================================
// Ensure present
// ============================================================================

#[tokio::test]
async fn test_create_then_rerun_is_idempotent() {
    let (store, usecase) = setup();
    let target = path("p01/a");
    let desired = overlay(&[("compression", "gzip"), ("quota", "10G")]);

    let first = usecase.ensure_present(&target, &desired).await.unwrap();
    assert_eq!(first.state, DatasetState::PresentCreated);
    assert!(first.changed);
    assert_eq!(first.summary(), "Created dataset p01/a");
    assert_eq!(first.details["properties"]["compression"], "gzip");

    let props = store.properties(&target).await.unwrap();
    assert_eq!(props.len(), 41);
    assert_eq!(props["quota"], PropertyValue::from("10G"));
    assert_eq!(props["recordsize"], PropertyValue::Int(131_072));

    store.clear_calls().await;
    let second = usecase.ensure_present(&target, &desired).await.unwrap();
    assert_eq!(second.state, DatasetState::PresentUnchanged);
    assert!(!second.changed);
    assert_eq!(store.calls().await, vec![StoreCall::GetProperties(target)]);
}

#[tokio::test]
async fn test_quota_zero_matches_unset() {
    let (store, usecase) = setup();
    let target = path("p01/a");
    usecase
        .ensure_present(&target, &PropertyMap::new())
        .await
        .unwrap();
    store.clear_calls().await;

    let outcome = usecase
        .ensure_present(&target, &overlay(&[("quota", "0"), ("refreservation", "none")]))
        .await
        .unwrap();
    assert_eq!(outcome.state, DatasetState::PresentUnchanged);
    assert!(mutations(&store.calls().await).is_empty());
}

#[tokio::test]
async fn test_only_differing_properties_are_sent() {
    let (store, usecase) = setup();
    let target = path("p01/a");
    usecase
        .ensure_present(&target, &PropertyMap::new())
        .await
        .unwrap();
    store.clear_calls().await;

    let outcome = usecase
        .ensure_present(
            &target,
            &overlay(&[("compression", "gzip"), ("atime", "on"), ("copies", "2")]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.state, DatasetState::PresentModified);
    assert_eq!(outcome.summary(), "Modified properties on dataset p01/a");
    let sent: PropertyMap = overlay(&[("compression", "gzip"), ("copies", "2")]);
    let sent_wire = sent
        .iter()
        .map(|(k, v)| (k.clone(), v.to_wire()))
        .collect();
    assert_eq!(
        mutations(&store.calls().await),
        vec![&StoreCall::SetProperties(target.clone(), sent_wire)]
    );
    assert_eq!(outcome.details["updates"]["copies"], "2");
    assert!(outcome.details["updates"].get("atime").is_none());
}

#[tokio::test]
async fn test_unknown_property_never_reaches_store() {
    let (store, usecase) = setup();
    let err = usecase
        .ensure_present(&path("p01/a"), &overlay(&[("dedup", "on")]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot update 'dedup'; because it is not a known property name"
    );
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn test_missing_parent_fails_without_change() {
    let (_store, usecase) = setup();
    let outcome = usecase
        .ensure_present(&path("p01/x/y"), &PropertyMap::new())
        .await
        .unwrap();
    assert_eq!(outcome.state, DatasetState::Failed(FailureKind::Other));
    assert!(!outcome.changed);
    assert_eq!(
        outcome.error.as_deref(),
        Some("cannot create 'p01/x/y': parent dataset does not exist")
    );
}

#[tokio::test]
async fn test_capacity_failure() {
    let store = Arc::new(MemoryDatasetStore::with_pools(["p01"]).with_capacity(1 << 30));
    let usecase = ReconcileDatasetUseCase::new(store.clone(), DefaultProfile::standard());

    let mut desired = PropertyMap::new();
    desired.insert("quota".to_string(), PropertyValue::Int(4 << 30));
    let outcome = usecase
        .ensure_present(&path("p01/a"), &desired)
        .await
        .unwrap();

    assert_eq!(outcome.state, DatasetState::Failed(FailureKind::Capacity));
    assert!(!outcome.succeeded);
    assert!(!outcome.changed);
    assert!(!store.paths().await.contains(&path("p01/a")));
}

// ============================================================================
// Update properties
// ============================================================================

#[tokio::test]
async fn test_update_properties_on_seeded_dataset() {
    let (store, usecase) = setup();
    store
        .load_listing(
            "p01/a\tcompression\tlz4\tlocal\n\
             p01/a\tquota\tnone\tdefault\n\
             p01/a\tavailable\t1T\t-\n",
        )
        .await
        .unwrap();

    let outcome = usecase
        .update_properties(&path("p01/a"), &overlay(&[("quota", "10G")]))
        .await
        .unwrap();
    assert_eq!(outcome.state, DatasetState::PresentModified);
    assert_eq!(outcome.details["updates"]["quota"], "10G");

    let absent = usecase
        .update_properties(&path("p01/b"), &overlay(&[("quota", "10G")]))
        .await
        .unwrap();
    assert_eq!(absent.state, DatasetState::Failed(FailureKind::Absent));
    assert_eq!(absent.details["dataset_absent"], true);
}

// ============================================================================
// Ensure absent
// ============================================================================

async fn seed_tree(store: &MemoryDatasetStore) {
    for p in ["p01/a", "p01/a/b", "p01/a/b/c", "p01/a/z", "p01/ab"] {
        store.insert(path(p), PropertyMap::new()).await;
    }
}

#[tokio::test]
async fn test_non_recursive_destroy_reports_descendants() {
    let (store, usecase) = setup();
    seed_tree(&store).await;

    let outcome = usecase.ensure_absent(&path("p01/a"), false).await.unwrap();
    assert_eq!(
        outcome.state,
        DatasetState::Failed(FailureKind::RequiresRecursive)
    );
    assert!(!outcome.changed);
    assert_eq!(
        outcome.details["descendants"],
        serde_json::json!(["p01/a/z", "p01/a/b/c", "p01/a/b"])
    );
    assert_eq!(store.paths().await.len(), 6);
}

#[tokio::test]
async fn test_recursive_destroy_goes_deepest_and_last_first() {
    let (store, usecase) = setup();
    seed_tree(&store).await;

    let outcome = usecase.ensure_absent(&path("p01/a"), true).await.unwrap();
    assert_eq!(outcome.state, DatasetState::Destroyed);
    assert!(outcome.changed);
    assert_eq!(
        outcome.details["destroyed"],
        serde_json::json!(["p01/a/z", "p01/a/b/c", "p01/a/b", "p01/a"])
    );
    assert_eq!(store.paths().await, vec![path("p01"), path("p01/ab")]);

    let again = usecase.ensure_absent(&path("p01/a"), true).await.unwrap();
    assert_eq!(again.state, DatasetState::Absent);
    assert!(!again.changed);
    assert_eq!(
        again.summary(),
        "No changes to already absent dataset p01/a"
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_configured_profile_applies_to_new_datasets() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "dataset:\n  storage_profile: vmware_filesystem\n  recursive_destroy: true\n  defaults:\n    compression: gzip\n    quota: 0\n"
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert!(config.validate().is_empty());
    let store = Arc::new(MemoryDatasetStore::with_pools(["p01"]));
    let usecase = ReconcileDatasetUseCase::from_config(store.clone(), &config).unwrap();
    usecase
        .ensure_present(&path("p01/vm"), &PropertyMap::new())
        .await
        .unwrap();

    let props = store.properties(&path("p01/vm")).await.unwrap();
    assert_eq!(props["compression"], PropertyValue::from("gzip"));
    assert_eq!(
        props["racktop:storage_profile"],
        PropertyValue::from("vmware_filesystem")
    );
    assert_eq!(props["quota"], PropertyValue::Unset);

    store.insert(path("p01/vm/disk0"), PropertyMap::new()).await;
    let outcome = usecase.ensure_absent_configured(&path("p01/vm")).await.unwrap();
    assert_eq!(outcome.state, DatasetState::Destroyed);
    assert_eq!(store.paths().await, vec![path("p01")]);
}
