//! Authorization guard behaviour across the public API

use std::sync::Arc;

use core_kernel::{ErrorKind, Principal};
use domain_access::{AccessError, AuthorizationGuard, InMemoryInsurerStore, InsurerStore};

async fn setup() -> (AuthorizationGuard, Arc<InMemoryInsurerStore>, Principal) {
    let store = Arc::new(InMemoryInsurerStore::new());
    let owner = Principal::new();
    let guard = AuthorizationGuard::initialize(store.clone(), owner)
        .await
        .expect("guard initializes");
    (guard, store, owner)
}

#[tokio::test]
async fn test_non_owner_cannot_add_insurer() {
    let (guard, _, _) = setup().await;
    let stranger = Principal::new();
    let target = Principal::new();

    let err = guard.add_insurer(stranger, target).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!guard.is_insurer(target).await.unwrap());
}

#[tokio::test]
async fn test_owner_adds_insurer() {
    let (guard, _, owner) = setup().await;
    let insurer = Principal::new();

    guard.add_insurer(owner, insurer).await.unwrap();

    assert!(guard.is_insurer(insurer).await.unwrap());
    assert!(guard.ensure_insurer(insurer, "issue_policy").await.is_ok());
}

#[tokio::test]
async fn test_added_insurer_cannot_add_others() {
    let (guard, _, owner) = setup().await;
    let insurer = Principal::new();
    guard.add_insurer(owner, insurer).await.unwrap();

    let result = guard.add_insurer(insurer, Principal::new()).await;

    assert!(matches!(result, Err(AccessError::Unauthorized { .. })));
}

#[tokio::test]
async fn test_adding_twice_is_idempotent() {
    let (guard, _, owner) = setup().await;
    let insurer = Principal::new();

    guard.add_insurer(owner, insurer).await.unwrap();
    guard.add_insurer(owner, insurer).await.unwrap();

    let insurers = guard.insurers().await.unwrap();
    assert_eq!(insurers.iter().filter(|p| **p == insurer).count(), 1);
    assert_eq!(insurers.len(), 2);
}

#[tokio::test]
async fn test_null_insurer_rejected() {
    let (guard, _, owner) = setup().await;
    let err = guard.add_insurer(owner, Principal::NULL).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_reinitializing_keeps_recorded_owner() {
    let (_, store, owner) = setup().await;

    let reopened = AuthorizationGuard::initialize(store.clone(), Principal::new())
        .await
        .unwrap();

    assert_eq!(reopened.owner(), owner);
    assert_eq!(store.owner().await.unwrap(), Some(owner));
}

#[tokio::test]
async fn test_unauthorized_message_names_action() {
    let (guard, _, _) = setup().await;
    let err = guard
        .ensure_insurer(Principal::new(), "approve_claim")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("approve_claim"));
}
