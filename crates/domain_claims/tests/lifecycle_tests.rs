//! End-to-end claim lifecycle across the guard, policy and claim registries

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    ClaimId, Currency, DomainPort, ErrorKind, HealthCheckResult, HealthCheckable, ManualClock,
    Money, PolicyId, PortError, Principal, RecordingPublisher,
};
use domain_access::{AuthorizationGuard, InMemoryInsurerStore};
use domain_claims::{
    Claim, ClaimError, ClaimEvent, ClaimRegistry, ClaimRegistryConfig, ClaimStatus, ClaimStore,
    InMemoryClaimStore, InMemoryFundLedger, PayoutOrdering,
};
use domain_policy::{
    InMemoryPolicyStore, IssuePolicyRequest, PolicyEvent, PolicyRegistry, PolicyStatus,
    PolicyStore,
};

// ============================================================================
// Setup
// ============================================================================

struct World {
    guard: Arc<AuthorizationGuard>,
    policies: Arc<PolicyRegistry>,
    policy_store: Arc<InMemoryPolicyStore>,
    claims: Arc<ClaimRegistry>,
    ledger: Arc<InMemoryFundLedger>,
    clock: Arc<ManualClock>,
    claim_events: RecordingPublisher<ClaimEvent>,
    owner: Principal,
    insurer: Principal,
    holder: Principal,
}

async fn world(ordering: PayoutOrdering) -> World {
    let owner = Principal::new();
    let insurer = Principal::new();
    let holder = Principal::new();

    let guard = Arc::new(
        AuthorizationGuard::initialize(Arc::new(InMemoryInsurerStore::new()), owner)
            .await
            .unwrap(),
    );
    guard.add_insurer(owner, insurer).await.unwrap();

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap(),
    ));
    let policy_store = Arc::new(InMemoryPolicyStore::new());
    let policies = Arc::new(PolicyRegistry::new(
        policy_store.clone(),
        guard.clone(),
        clock.clone(),
        Arc::new(RecordingPublisher::<PolicyEvent>::new()),
    ));

    let ledger = Arc::new(InMemoryFundLedger::new());
    let claim_events = RecordingPublisher::new();
    let claims = Arc::new(
        ClaimRegistry::new(
            Arc::new(InMemoryClaimStore::new()),
            policies.clone(),
            guard.clone(),
            ledger.clone(),
            clock.clone(),
            Arc::new(claim_events.clone()),
        )
        .with_config(ClaimRegistryConfig { payout_ordering: ordering }),
    );

    World {
        guard,
        policies,
        policy_store,
        claims,
        ledger,
        clock,
        claim_events,
        owner,
        insurer,
        holder,
    }
}

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

async fn issue_standard_policy(w: &World) -> PolicyId {
    w.policies
        .issue_policy(
            w.insurer,
            IssuePolicyRequest {
                policyholder: w.holder,
                premium_amount: usd(dec!(100)),
                coverage_amount: usd(dec!(5000)),
                duration: Duration::days(30),
            },
        )
        .await
        .unwrap()
}

async fn approved_claim(w: &World) -> ClaimId {
    let policy_id = issue_standard_policy(w).await;
    let claim_id = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(3000)), "Storm damage")
        .await
        .unwrap();
    w.claims.approve_claim(claim_id, w.insurer).await.unwrap();
    claim_id
}

// ============================================================================
// Full scenario
// ============================================================================

#[tokio::test]
async fn test_issue_pay_claim_approve_payout_scenario() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;

    w.policies.pay_premium(policy_id, w.holder, usd(dec!(100))).await.unwrap();
    let policy = w.policies.get_policy_details(policy_id).await.unwrap();
    assert_eq!(policy.total_premiums_paid, usd(dec!(100)));

    let err = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(6000)), "Total loss")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClaimExceedsCoverage);

    let claim_id = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(3000)), "Storm damage")
        .await
        .unwrap();
    assert_eq!(
        w.claims.get_claim_details(claim_id).await.unwrap().status,
        ClaimStatus::Submitted
    );

    w.claims.approve_claim(claim_id, w.insurer).await.unwrap();
    assert_eq!(
        w.claims.get_claim_details(claim_id).await.unwrap().status,
        ClaimStatus::Approved
    );

    let receipt = w.claims.pay_claim(claim_id, w.insurer).await.unwrap();
    assert_eq!(receipt.to, w.holder);
    assert_eq!(receipt.amount, usd(dec!(3000)));

    let claim = w.claims.get_claim_details(claim_id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Paid);
    assert_eq!(w.ledger.transfer_count().await, 1);

    let err = w.claims.pay_claim(claim_id, w.insurer).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(w.ledger.transfer_count().await, 1);

    let kinds: Vec<&str> = w
        .claim_events
        .events()
        .iter()
        .map(|e| match e {
            ClaimEvent::ClaimSubmitted { .. } => "submitted",
            ClaimEvent::ClaimApproved { .. } => "approved",
            ClaimEvent::ClaimRejected { .. } => "rejected",
            ClaimEvent::ClaimPaid { .. } => "paid",
        })
        .collect();
    assert_eq!(kinds, vec!["submitted", "approved", "paid"]);
}

#[tokio::test]
async fn test_owner_grants_insurer_who_then_issues() {
    let w = world(PayoutOrdering::default()).await;
    let newcomer = Principal::new();
    let terms = || IssuePolicyRequest {
        policyholder: Principal::new(),
        premium_amount: usd(dec!(10)),
        coverage_amount: usd(dec!(1000)),
        duration: Duration::days(1),
    };

    let err = w.guard.add_insurer(w.insurer, newcomer).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(
        w.policies.issue_policy(newcomer, terms()).await.unwrap_err().kind(),
        ErrorKind::Unauthorized
    );

    w.guard.add_insurer(w.owner, newcomer).await.unwrap();
    assert!(w.policies.issue_policy(newcomer, terms()).await.is_ok());
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_only_holder_can_submit() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;

    let err = w
        .claims
        .submit_claim(policy_id, w.insurer, usd(dec!(10)), "Not mine")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(w.claim_events.is_empty());
}

#[tokio::test]
async fn test_submit_against_unknown_policy() {
    let w = world(PayoutOrdering::default()).await;
    let err = w
        .claims
        .submit_claim(PolicyId::new(99), w.holder, usd(dec!(10)), "Ghost")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_submit_after_expiry() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;

    w.clock.advance(Duration::days(30) + Duration::seconds(1));
    let err = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(10)), "Late")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PolicyExpired);
}

#[tokio::test]
async fn test_submit_against_cancelled_policy() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;
    let mut policy = w.policies.get_policy_details(policy_id).await.unwrap();
    policy.status = PolicyStatus::Cancelled;
    w.policy_store.update(&policy).await.unwrap();

    let err = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(10)), "Cancelled")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PolicyNotActive);
}

#[tokio::test]
async fn test_submit_rejects_non_positive_and_foreign_amounts() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;

    for amount in [usd(dec!(0)), usd(dec!(-5)), Money::new(dec!(10), Currency::EUR)] {
        let err = w
            .claims
            .submit_claim(policy_id, w.holder, amount, "Bad amount")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

#[tokio::test]
async fn test_claim_equal_to_coverage_accepted() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;

    let claim_id = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(5000)), "Full coverage")
        .await
        .unwrap();

    let claims = w.claims.claims_for_policy(policy_id).await.unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].id, claim_id);
    assert_eq!(claims[0].reason, "Full coverage");
}

// ============================================================================
// Adjudication
// ============================================================================

#[tokio::test]
async fn test_non_insurer_cannot_decide() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;
    let claim_id = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(100)), "Dent")
        .await
        .unwrap();

    for result in [
        w.claims.approve_claim(claim_id, w.holder).await,
        w.claims.reject_claim(claim_id, w.holder).await,
    ] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
    }
    assert_eq!(
        w.claims.get_claim_details(claim_id).await.unwrap().status,
        ClaimStatus::Submitted
    );
}

#[tokio::test]
async fn test_rejected_claim_is_terminal() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;
    let claim_id = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(100)), "Dent")
        .await
        .unwrap();

    w.claims.reject_claim(claim_id, w.owner).await.unwrap();

    let claim = w.claims.get_claim_details(claim_id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Rejected);
    assert_eq!(claim.decided_by, Some(w.owner));
    for result in [
        w.claims.approve_claim(claim_id, w.insurer).await,
        w.claims.reject_claim(claim_id, w.insurer).await,
    ] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);
    }
    assert_eq!(
        w.claims.pay_claim(claim_id, w.insurer).await.unwrap_err().kind(),
        ErrorKind::InvalidState
    );
    assert_eq!(w.ledger.transfer_count().await, 0);
}

#[tokio::test]
async fn test_approved_claim_cannot_be_rejected_or_reapproved() {
    let w = world(PayoutOrdering::default()).await;
    let claim_id = approved_claim(&w).await;

    assert!(matches!(
        w.claims.reject_claim(claim_id, w.insurer).await,
        Err(ClaimError::InvalidState { .. })
    ));
    assert!(matches!(
        w.claims.approve_claim(claim_id, w.insurer).await,
        Err(ClaimError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn test_approval_rechecks_coverage() {
    let w = world(PayoutOrdering::default()).await;
    let policy_id = issue_standard_policy(&w).await;
    let claim_id = w
        .claims
        .submit_claim(policy_id, w.holder, usd(dec!(3000)), "Flood")
        .await
        .unwrap();

    let mut policy = w.policies.get_policy_details(policy_id).await.unwrap();
    policy.coverage_amount = usd(dec!(2000));
    w.policy_store.update(&policy).await.unwrap();

    let err = w.claims.approve_claim(claim_id, w.insurer).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientCoverage);
    assert_eq!(
        w.claims.get_claim_details(claim_id).await.unwrap().status,
        ClaimStatus::Submitted
    );
}

#[tokio::test]
async fn test_pay_unknown_claim() {
    let w = world(PayoutOrdering::default()).await;
    let err = w.claims.pay_claim(ClaimId::new(12), w.insurer).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Payout
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_payouts_pay_once() {
    let w = world(PayoutOrdering::default()).await;
    let claim_id = approved_claim(&w).await;

    let first = {
        let claims = w.claims.clone();
        let insurer = w.insurer;
        tokio::spawn(async move { claims.pay_claim(claim_id, insurer).await })
    };
    let second = {
        let claims = w.claims.clone();
        let insurer = w.owner;
        tokio::spawn(async move { claims.pay_claim(claim_id, insurer).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let invalid = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::InvalidState))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(invalid, 1);
    assert_eq!(w.ledger.transfer_count().await, 1);
}

#[tokio::test]
async fn test_failed_transfer_leaves_claim_paid_by_default() {
    let w = world(PayoutOrdering::MarkPaidFirst).await;
    let claim_id = approved_claim(&w).await;
    w.ledger.set_failing(true);

    let err = w.claims.pay_claim(claim_id, w.insurer).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransferFailed);
    let claim = w.claims.get_claim_details(claim_id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Paid);
    assert!(!w
        .claim_events
        .events()
        .iter()
        .any(|e| matches!(e, ClaimEvent::ClaimPaid { .. })));

    w.ledger.set_failing(false);
    let retry = w.claims.pay_claim(claim_id, w.insurer).await.unwrap_err();
    assert_eq!(retry.kind(), ErrorKind::InvalidState);
    assert_eq!(w.ledger.transfer_count().await, 0);
}

#[tokio::test]
async fn test_failed_transfer_rolls_back_when_configured() {
    let w = world(PayoutOrdering::RollbackOnFailure).await;
    let claim_id = approved_claim(&w).await;
    w.ledger.set_failing(true);

    let err = w.claims.pay_claim(claim_id, w.insurer).await.unwrap_err();

    assert!(matches!(err, ClaimError::TransferFailed { .. }));
    let claim = w.claims.get_claim_details(claim_id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Approved);
    assert!(claim.paid_at.is_none());

    w.ledger.set_failing(false);
    w.claims.pay_claim(claim_id, w.insurer).await.unwrap();
    assert_eq!(
        w.claims.get_claim_details(claim_id).await.unwrap().status,
        ClaimStatus::Paid
    );
    assert_eq!(w.ledger.transfer_count().await, 1);
}

/// Claim store that refuses to write a claim back to `Approved` once armed
#[derive(Debug, Default)]
struct RollbackRefusingStore {
    inner: InMemoryClaimStore,
    refuse_rollback: AtomicBool,
}

impl DomainPort for RollbackRefusingStore {}

#[async_trait]
impl HealthCheckable for RollbackRefusingStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check().await
    }
}

#[async_trait]
impl ClaimStore for RollbackRefusingStore {
    async fn next_id(&self) -> Result<ClaimId, PortError> {
        self.inner.next_id().await
    }

    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        self.inner.get(id).await
    }

    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        self.inner.insert(claim).await
    }

    async fn update(&self, claim: &Claim) -> Result<(), PortError> {
        let armed = self.refuse_rollback.load(AtomicOrdering::SeqCst);
        if armed && claim.status == ClaimStatus::Approved {
            return Err(PortError::connection("store went away"));
        }
        self.inner.update(claim).await
    }

    async fn find_by_policy(&self, policy_id: PolicyId) -> Result<Vec<Claim>, PortError> {
        self.inner.find_by_policy(policy_id).await
    }
}

#[tokio::test]
async fn test_unpersisted_rollback_surfaces_storage_error() {
    let w = world(PayoutOrdering::RollbackOnFailure).await;
    let store = Arc::new(RollbackRefusingStore::default());
    let claims = ClaimRegistry::new(
        store.clone(),
        w.policies.clone(),
        w.guard.clone(),
        w.ledger.clone(),
        w.clock.clone(),
        Arc::new(RecordingPublisher::<ClaimEvent>::new()),
    )
    .with_config(ClaimRegistryConfig {
        payout_ordering: PayoutOrdering::RollbackOnFailure,
    });

    let policy_id = issue_standard_policy(&w).await;
    let claim_id = claims
        .submit_claim(policy_id, w.holder, usd(dec!(800)), "Hail")
        .await
        .unwrap();
    claims.approve_claim(claim_id, w.insurer).await.unwrap();

    store.refuse_rollback.store(true, AtomicOrdering::SeqCst);
    w.ledger.set_failing(true);
    let err = claims.pay_claim(claim_id, w.insurer).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    let claim = claims.get_claim_details(claim_id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Paid);
    assert_eq!(w.ledger.transfer_count().await, 0);
}

// ============================================================================
// Properties
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn claims_above_coverage_always_rejected(excess_cents in 1i64..10_000_000i64) {
        let (kind, stored) = runtime().block_on(async {
            let w = world(PayoutOrdering::default()).await;
            let policy_id = issue_standard_policy(&w).await;
            let amount = Money::from_minor(500_000 + excess_cents, Currency::USD);
            let kind = w
                .claims
                .submit_claim(policy_id, w.holder, amount, "Too much")
                .await
                .unwrap_err()
                .kind();
            let stored = w.claims.claims_for_policy(policy_id).await.unwrap().len();
            (kind, stored)
        });

        prop_assert_eq!(kind, ErrorKind::ClaimExceedsCoverage);
        prop_assert_eq!(stored, 0);
    }

    #[test]
    fn claims_within_coverage_accepted(cents in 1i64..=500_000i64) {
        let status = runtime().block_on(async {
            let w = world(PayoutOrdering::default()).await;
            let policy_id = issue_standard_policy(&w).await;
            let claim_id = w
                .claims
                .submit_claim(policy_id, w.holder, Money::from_minor(cents, Currency::USD), "Ok")
                .await
                .unwrap();
            w.claims.get_claim_details(claim_id).await.unwrap().status
        });

        prop_assert_eq!(status, ClaimStatus::Submitted);
    }
}
