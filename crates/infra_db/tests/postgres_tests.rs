//! Repository integration tests against a PostgreSQL testcontainer
//!
//! These need a Docker daemon and are ignored by default:
//! `cargo test -p infra_db -- --ignored`

use std::sync::Arc;

use chrono::Utc;

use core_kernel::{
    ClaimId, Currency, ErrorKind, HealthCheckable, ManualClock, Money, PolicyId, PortError,
    Principal, RecordingPublisher,
};
use domain_access::{AuthorizationGuard, InsurerStore};
use domain_claims::{Claim, ClaimRegistry, ClaimStatus, ClaimStore, InMemoryFundLedger};
use domain_policy::{Policy, PolicyRegistry, PolicyStatus, PolicyStore};
use infra_db::{
    create_pool, run_migrations, ClaimRepository, DatabaseConfig, InsurerRepository,
    PolicyRepository,
};
use test_utils::{
    assert_claim_status, assert_error_kind, create_isolated_test_database, IssuePolicyRequestBuilder,
    MoneyFixtures, StringFixtures, TemporalFixtures,
};

// ============================================================================
// Insurer store
// ============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_owner_is_recorded_once() {
    let db = create_isolated_test_database().await.unwrap();
    let store = InsurerRepository::new(db.pool().clone());

    let first = Principal::new();
    let second = Principal::new();

    assert_eq!(store.owner().await.unwrap(), None);
    assert_eq!(store.initialize_owner(first).await.unwrap(), first);
    // a later owner never displaces the recorded one
    assert_eq!(store.initialize_owner(second).await.unwrap(), first);

    assert!(store.contains(first).await.unwrap());
    assert!(!store.contains(second).await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_insurer_insert_is_idempotent() {
    let db = create_isolated_test_database().await.unwrap();
    let store = InsurerRepository::new(db.pool().clone());
    let insurer = Principal::new();

    assert!(store.insert(insurer).await.unwrap());
    assert!(!store.insert(insurer).await.unwrap());
    assert_eq!(store.list().await.unwrap(), vec![insurer]);
}

// ============================================================================
// Policy and claim stores
// ============================================================================

fn sample_policy(id: PolicyId) -> Policy {
    Policy::issue(
        id,
        Principal::new(),
        IssuePolicyRequestBuilder::new().build(),
        TemporalFixtures::epoch(),
    )
    .unwrap()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_policy_round_trip_through_postgres() {
    let db = create_isolated_test_database().await.unwrap();
    let store = PolicyRepository::new(db.pool().clone());

    let id = store.next_id().await.unwrap();
    assert_eq!(id, PolicyId::FIRST);

    let mut policy = sample_policy(id);
    store.insert(&policy).await.unwrap();
    assert_eq!(store.get(id).await.unwrap(), Some(policy.clone()));

    policy.status = PolicyStatus::Cancelled;
    store.update(&policy).await.unwrap();
    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.status, PolicyStatus::Cancelled);

    let held = store.find_by_policyholder(policy.policyholder).await.unwrap();
    assert_eq!(held.len(), 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_duplicate_policy_insert_conflicts() {
    let db = create_isolated_test_database().await.unwrap();
    let store = PolicyRepository::new(db.pool().clone());

    let policy = sample_policy(store.next_id().await.unwrap());
    store.insert(&policy).await.unwrap();

    let result = store.insert(&policy).await;
    assert!(matches!(result, Err(PortError::Conflict { .. })));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_of_missing_rows_is_not_found() {
    let db = create_isolated_test_database().await.unwrap();
    let policies = PolicyRepository::new(db.pool().clone());

    let result = policies.update(&sample_policy(PolicyId::new(77))).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_claim_requires_existing_policy() {
    let db = create_isolated_test_database().await.unwrap();
    let claims = ClaimRepository::new(db.pool().clone());

    let claim = Claim::submit(
        ClaimId::FIRST,
        PolicyId::new(404),
        Principal::new(),
        MoneyFixtures::usd_claim(),
        StringFixtures::claim_reason(),
        Utc::now(),
    );

    assert!(claims.insert(&claim).await.is_err());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_health_checks_report_healthy() {
    let db = create_isolated_test_database().await.unwrap();

    let policy_health = PolicyRepository::new(db.pool().clone()).health_check().await;
    let claim_health = ClaimRepository::new(db.pool().clone()).health_check().await;

    assert!(policy_health.is_operational());
    assert!(claim_health.is_operational());
}

// ============================================================================
// Registries over PostgreSQL
// ============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_claim_lifecycle_persists() {
    let db = create_isolated_test_database().await.unwrap();
    let pool = db.pool().clone();

    let owner = Principal::new();
    let holder = Principal::new();
    let guard = Arc::new(
        AuthorizationGuard::initialize(Arc::new(InsurerRepository::new(pool.clone())), owner)
            .await
            .unwrap(),
    );
    let clock = Arc::new(ManualClock::new(TemporalFixtures::epoch()));
    let policies = Arc::new(PolicyRegistry::new(
        Arc::new(PolicyRepository::new(pool.clone())),
        guard.clone(),
        clock.clone(),
        Arc::new(RecordingPublisher::new()),
    ));
    let ledger = Arc::new(InMemoryFundLedger::new());
    let claims = ClaimRegistry::new(
        Arc::new(ClaimRepository::new(pool.clone())),
        policies.clone(),
        guard.clone(),
        ledger.clone(),
        clock.clone(),
        Arc::new(RecordingPublisher::new()),
    );

    let policy_id = policies
        .issue_policy(
            owner,
            IssuePolicyRequestBuilder::new().with_policyholder(holder).build(),
        )
        .await
        .unwrap();
    policies
        .pay_premium(policy_id, holder, MoneyFixtures::usd_premium())
        .await
        .unwrap();

    let claim_id = claims
        .submit_claim(policy_id, holder, MoneyFixtures::usd_claim(), "Hail")
        .await
        .unwrap();

    let early = claims.pay_claim(claim_id, owner).await;
    assert_error_kind(&early, ErrorKind::InvalidState);

    claims.approve_claim(claim_id, owner).await.unwrap();
    claims.pay_claim(claim_id, owner).await.unwrap();

    let stored = ClaimRepository::new(pool.clone())
        .get(claim_id)
        .await
        .unwrap()
        .unwrap();
    assert_claim_status(&stored, ClaimStatus::Paid);
    assert_eq!(stored.decided_by, Some(owner));

    let policy = policies.get_policy_details(policy_id).await.unwrap();
    assert_eq!(
        policy.total_premiums_paid,
        Money::new(MoneyFixtures::usd_premium().amount(), Currency::USD)
    );
    assert_eq!(ledger.transfer_count().await, 1);
}

// ============================================================================
// Pool and migrations
// ============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_migrations_apply_over_existing_schema() {
    let db = create_isolated_test_database().await.unwrap();

    let pool = create_pool(DatabaseConfig::new(db.url()).max_connections(2))
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = PolicyRepository::new(pool);
    assert_eq!(store.next_id().await.unwrap(), PolicyId::new(1));
}
