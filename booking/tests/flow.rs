//! End-to-end booking flow tests: a real store, scripted backend, in-memory
//! snapshot storage, and a shrunk polling schedule.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect

use salonflow_booking::payment::{
    PaymentFailure, PaymentMethod, PaymentStatus, PollingPolicy, ProviderPaymentStatus,
};
use salonflow_booking::types::{Money, SalonId, SalonSummary, ServiceItem};
use salonflow_booking::{
    BookingAction, BookingEnvironment, BookingFlowState, BookingReducer, rehydrate,
};
use salonflow_runtime::Store;
use salonflow_testing::mocks::{InMemoryDraftStore, MockBookingApi, test_clock};
use std::sync::Arc;
use std::time::Duration;

type FlowStore = Store<BookingFlowState, BookingAction, BookingEnvironment, BookingReducer>;

fn salon() -> SalonSummary {
    SalonSummary {
        id: SalonId::new("salon-1"),
        name: "Chez Awa".to_string(),
        address: Some("Ouakam, Dakar".to_string()),
        deposit_percentage: Some(25),
    }
}

fn braids() -> ServiceItem {
    ServiceItem::new("svc-1", "Braids", Money::from_francs(10_000), 120)
}

fn manicure() -> ServiceItem {
    ServiceItem::new("svc-2", "Manicure", Money::from_francs(3_000), 45)
}

fn fast_polling() -> PollingPolicy {
    PollingPolicy::new()
        .with_initial_delay(Duration::from_millis(10))
        .with_interval(Duration::from_millis(10))
        .with_max_attempts(10)
}

fn store_with(
    api: &Arc<MockBookingApi>,
    drafts: &Arc<InMemoryDraftStore>,
    polling: PollingPolicy,
) -> FlowStore {
    let env = BookingEnvironment::new(
        Arc::clone(api) as _,
        Arc::clone(drafts) as _,
        Arc::new(test_clock()),
    )
    .with_polling(polling);
    Store::new(BookingFlowState::default(), BookingReducer::new(), env)
}

/// Give an effect-produced action a moment to finish reducing
///
/// `send_and_wait_for` resolves on the broadcast, which happens just before
/// the action is applied; state assertions need the application too.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn send_and_settle(store: &FlowStore, action: BookingAction) {
    let mut handle = store.send(action).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();
}

/// Walk the wizard from an empty draft to the confirmation step
async fn drive_wizard_to_confirmation(store: &FlowStore) {
    let actions = [
        BookingAction::SetSalon(salon()),
        BookingAction::AddService(braids()),
        BookingAction::AddService(manicure()),
        BookingAction::NextStep,
        BookingAction::SetDate("2026-09-01".to_string()),
        BookingAction::SetTime("10:30".to_string()),
        BookingAction::NextStep,
        BookingAction::SetClientDetails {
            first_name: "Awa".to_string(),
            last_name: "Ndiaye".to_string(),
            phone: "771234567".to_string(),
            address: None,
        },
    ];
    for action in actions {
        send_and_settle(store, action).await;
    }
    assert_eq!(store.state(|s| s.draft.step).await, 3);
}

fn is_submission_outcome(action: &BookingAction) -> bool {
    matches!(
        action,
        BookingAction::SetBookingId(_) | BookingAction::SubmissionFailed { .. }
    )
}

fn is_payment_outcome(action: &BookingAction) -> bool {
    matches!(
        action,
        BookingAction::PaymentCompleted { .. }
            | BookingAction::PaymentFailed { .. }
            | BookingAction::PaymentTimedOut
            | BookingAction::PaymentRejected { .. }
            | BookingAction::PaymentInitFailed { .. }
    )
}

#[tokio::test]
async fn mobile_money_flow_completes_end_to_end() {
    let api = Arc::new(
        MockBookingApi::default()
            .with_appointment_id("apt-7")
            .with_payment_id("pay-7")
            .with_statuses([
                ProviderPaymentStatus::Pending("PENDING".to_string()),
                ProviderPaymentStatus::Pending("PROCESSING".to_string()),
                ProviderPaymentStatus::Completed,
            ]),
    );
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    drive_wizard_to_confirmation(&store).await;

    // Submission returns the backend id
    let outcome = store
        .send_and_wait_for(
            BookingAction::SubmitAppointment,
            is_submission_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    let BookingAction::SetBookingId(id) = outcome else {
        panic!("expected SetBookingId, got {outcome:?}");
    };
    assert_eq!(id.as_str(), "apt-7");
    settle().await;
    assert!(store.state(|s| s.draft.booking_id.is_some()).await);

    send_and_settle(&store, BookingAction::SelectPaymentMethod(PaymentMethod::Wave)).await;
    send_and_settle(
        &store,
        BookingAction::SetPaymentPhone("77 123 45 67".to_string()),
    )
    .await;

    let outcome = store
        .send_and_wait_for(
            BookingAction::StartPayment,
            is_payment_outcome,
            Duration::from_secs(2),
        )
        .await
        .unwrap();
    let BookingAction::PaymentCompleted {
        booking_id,
        payment_id,
    } = outcome
    else {
        panic!("expected PaymentCompleted, got {outcome:?}");
    };
    assert_eq!(booking_id.as_str(), "apt-7");
    assert_eq!(payment_id.map(|p| p.as_str().to_string()), Some("pay-7".to_string()));

    // Let the completion event finish reducing before inspecting state
    settle().await;

    // The deposit (25% of 13 000), not the full price, was charged
    assert_eq!(
        api.init_requests()[0].amount,
        Money::from_francs(3_250)
    );
    assert_eq!(api.payment_status_calls(), 3);

    // Terminal success destroys the draft and its snapshot
    let (draft, payment_status) = store
        .state(|s| (s.draft.clone(), s.payment.status))
        .await;
    assert!(draft.services.is_empty());
    assert!(draft.booking_id.is_none());
    assert_eq!(payment_status, PaymentStatus::Completed);
    assert!(drafts.snapshot().is_none());
}

#[tokio::test]
async fn pay_on_site_confirms_synchronously() {
    let api = Arc::new(MockBookingApi::default().with_appointment_id("apt-9"));
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    drive_wizard_to_confirmation(&store).await;
    store
        .send_and_wait_for(
            BookingAction::SubmitAppointment,
            is_submission_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    settle().await;
    send_and_settle(
        &store,
        BookingAction::SelectPaymentMethod(PaymentMethod::PayOnSite),
    )
    .await;

    let outcome = store
        .send_and_wait_for(
            BookingAction::StartPayment,
            is_payment_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, BookingAction::PaymentCompleted { .. }));

    settle().await;

    // One confirmation call carrying the deposit; no init, no polling
    let confirms = api.confirm_requests();
    assert_eq!(confirms.len(), 1);
    assert_eq!(confirms[0].0, Money::from_francs(3_250));
    assert_eq!(confirms[0].1.as_str(), "apt-9");
    assert_eq!(api.init_payment_calls(), 0);
    assert_eq!(api.payment_status_calls(), 0);
    assert!(drafts.snapshot().is_none());
}

#[tokio::test]
async fn polling_stops_at_the_attempt_budget() {
    // Status never leaves PENDING: the loop must stop at the budget
    let api = Arc::new(MockBookingApi::default());
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(
        &api,
        &drafts,
        fast_polling().with_max_attempts(3),
    );

    drive_wizard_to_confirmation(&store).await;
    store
        .send_and_wait_for(
            BookingAction::SubmitAppointment,
            is_submission_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    settle().await;
    send_and_settle(&store, BookingAction::SelectPaymentMethod(PaymentMethod::OrangeMoney)).await;
    send_and_settle(
        &store,
        BookingAction::SetPaymentPhone("221771234567".to_string()),
    )
    .await;

    let outcome = store
        .send_and_wait_for(
            BookingAction::StartPayment,
            is_payment_outcome,
            Duration::from_secs(2),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, BookingAction::PaymentTimedOut));

    settle().await;
    assert_eq!(api.payment_status_calls(), 3);

    // Well past several more intervals: the loop never polls again
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(api.payment_status_calls(), 3);

    let (status, failure) = store
        .state(|s| (s.payment.status, s.payment.last_failure.clone()))
        .await;
    assert_eq!(status, PaymentStatus::Idle);
    assert_eq!(failure, Some(PaymentFailure::TimedOut));
}

#[tokio::test]
async fn dismissing_pending_confirmation_stops_the_timer() {
    let api = Arc::new(MockBookingApi::default());
    let drafts = Arc::new(InMemoryDraftStore::default());
    // First check far enough out that dismissal lands before it
    let store = store_with(
        &api,
        &drafts,
        PollingPolicy::new()
            .with_initial_delay(Duration::from_millis(300))
            .with_interval(Duration::from_millis(50))
            .with_max_attempts(100),
    );

    drive_wizard_to_confirmation(&store).await;
    store
        .send_and_wait_for(
            BookingAction::SubmitAppointment,
            is_submission_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    settle().await;
    send_and_settle(&store, BookingAction::SelectPaymentMethod(PaymentMethod::Wave)).await;
    send_and_settle(
        &store,
        BookingAction::SetPaymentPhone("771234567".to_string()),
    )
    .await;

    let outcome = store
        .send_and_wait_for(
            BookingAction::StartPayment,
            |a| matches!(a, BookingAction::PaymentInitiated { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, BookingAction::PaymentInitiated { .. }));

    // Give the initiation a moment to reduce, then dismiss
    settle().await;
    send_and_settle(&store, BookingAction::DismissPayment).await;

    // Well past the first scheduled check: no status call ever fires
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(api.payment_status_calls(), 0);
    assert_eq!(
        store.state(|s| s.payment.status).await,
        PaymentStatus::Idle
    );
}

#[tokio::test]
async fn backend_rejection_blocks_payment() {
    let api = Arc::new(MockBookingApi::default().failing_create("slot already taken"));
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    drive_wizard_to_confirmation(&store).await;

    let outcome = store
        .send_and_wait_for(
            BookingAction::SubmitAppointment,
            is_submission_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    let BookingAction::SubmissionFailed { reason } = outcome else {
        panic!("expected SubmissionFailed, got {outcome:?}");
    };
    assert_eq!(reason, "slot already taken");

    settle().await;
    assert_eq!(
        store.state(|s| s.last_error.clone()).await,
        Some("slot already taken".to_string())
    );
    assert!(store.state(|s| s.draft.booking_id.is_none()).await);

    // Without an appointment, payment is rejected before any network call
    send_and_settle(&store, BookingAction::SelectPaymentMethod(PaymentMethod::Wave)).await;
    send_and_settle(
        &store,
        BookingAction::SetPaymentPhone("771234567".to_string()),
    )
    .await;
    let outcome = store
        .send_and_wait_for(
            BookingAction::StartPayment,
            is_payment_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, BookingAction::PaymentRejected { .. }));
    assert_eq!(api.init_payment_calls(), 0);
}

#[tokio::test]
async fn init_failure_returns_to_idle() {
    let api = Arc::new(MockBookingApi::default().failing_init("wallet unreachable"));
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    drive_wizard_to_confirmation(&store).await;
    store
        .send_and_wait_for(
            BookingAction::SubmitAppointment,
            is_submission_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    settle().await;
    send_and_settle(&store, BookingAction::SelectPaymentMethod(PaymentMethod::Wave)).await;
    send_and_settle(
        &store,
        BookingAction::SetPaymentPhone("771234567".to_string()),
    )
    .await;

    let outcome = store
        .send_and_wait_for(
            BookingAction::StartPayment,
            is_payment_outcome,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    let BookingAction::PaymentInitFailed { reason } = outcome else {
        panic!("expected PaymentInitFailed, got {outcome:?}");
    };
    assert_eq!(reason, "wallet unreachable");

    settle().await;
    let (status, failure) = store
        .state(|s| (s.payment.status, s.payment.last_failure.clone()))
        .await;
    assert_eq!(status, PaymentStatus::Idle);
    assert!(matches!(failure, Some(PaymentFailure::Network { .. })));
    assert_eq!(api.payment_status_calls(), 0);
}

#[tokio::test]
async fn draft_resumes_from_persisted_snapshot() {
    let api = Arc::new(MockBookingApi::default());
    let drafts = Arc::new(InMemoryDraftStore::default());

    {
        let store = store_with(&api, &drafts, fast_polling());
        drive_wizard_to_confirmation(&store).await;
    }

    // A new process rehydrates the snapshot wholesale
    let resumed = rehydrate(drafts.as_ref()).await;
    assert_eq!(resumed.draft.step, 3);
    assert_eq!(resumed.draft.services.len(), 2);
    assert_eq!(resumed.draft.total_price, Money::from_francs(13_000));
    assert_eq!(resumed.draft.date.as_deref(), Some("2026-09-01"));
    // The payment attempt does not survive a restart
    assert_eq!(resumed.payment.status, PaymentStatus::Idle);
}

#[tokio::test]
async fn reset_clears_state_and_snapshot() {
    let api = Arc::new(MockBookingApi::default());
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    send_and_settle(&store, BookingAction::SetSalon(salon())).await;
    send_and_settle(&store, BookingAction::AddService(braids())).await;
    assert!(drafts.snapshot().is_some());

    send_and_settle(&store, BookingAction::ResetBooking).await;

    assert!(drafts.snapshot().is_none());
    let draft = store.state(|s| s.draft.clone()).await;
    assert!(draft.salon.is_none());
    assert!(draft.services.is_empty());
    assert_eq!(draft.total_price, Money::ZERO);

    // Re-initializing observes the empty draft, not a resumed one
    let resumed = rehydrate(drafts.as_ref()).await;
    assert!(!resumed.draft.has_progress());
}

#[tokio::test]
async fn wizard_back_from_first_step_requests_exit() {
    let api = Arc::new(MockBookingApi::default());
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    let outcome = store
        .send_and_wait_for(
            BookingAction::PrevStep,
            |a| matches!(a, BookingAction::ExitRequested),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, BookingAction::ExitRequested));
    assert_eq!(store.state(|s| s.draft.step).await, 1);
}

#[tokio::test]
async fn guarded_next_step_does_not_advance() {
    let api = Arc::new(MockBookingApi::default());
    let drafts = Arc::new(InMemoryDraftStore::default());
    let store = store_with(&api, &drafts, fast_polling());

    send_and_settle(&store, BookingAction::NextStep).await;

    let (step, error) = store
        .state(|s| (s.draft.step, s.last_error.clone()))
        .await;
    assert_eq!(step, 1);
    assert!(error.is_some());
}
