//! Booking flow reducer: wizard transitions, persistence boundaries,
//! idempotent appointment submission, and the deposit payment state machine.

use crate::action::BookingAction;
use crate::api::{BookingApi, CreateAppointmentRequest, InitPaymentRequest};
use crate::draft::{BookingDraft, DraftSnapshot, FIRST_STEP};
use crate::error::ValidationError;
use crate::payment::{
    PaymentAttempt, PaymentFailure, PaymentMethod, PaymentStatus, PollingPolicy,
    ProviderPaymentStatus, poll_effect_id,
};
use crate::phone;
use crate::pricing::BookingSummary;
use crate::storage::DraftStore;
use salonflow_core::effect::Effect;
use salonflow_core::environment::Clock;
use salonflow_core::reducer::Reducer;
use salonflow_core::{SmallVec, smallvec};
use std::sync::Arc;

/// Top-level state of the booking flow
#[derive(Debug, Clone, Default)]
pub struct BookingFlowState {
    /// The in-progress reservation
    pub draft: BookingDraft,
    /// The transient payment attempt
    pub payment: PaymentAttempt,
    /// Last user-facing error message (inline surface)
    pub last_error: Option<String>,
}

/// Load any persisted draft and build the initial flow state
///
/// A persisted snapshot replaces in-memory state wholesale (not merged) and
/// resumes the wizard at the persisted step. An unreadable snapshot is
/// logged and ignored; a corrupt file must never block a new booking.
pub async fn rehydrate(drafts: &dyn DraftStore) -> BookingFlowState {
    match drafts.load().await {
        Ok(Some(snapshot)) => {
            tracing::info!(
                saved_at = %snapshot.saved_at,
                step = snapshot.draft.step,
                "resuming persisted booking draft"
            );
            BookingFlowState {
                draft: snapshot.draft,
                ..BookingFlowState::default()
            }
        },
        Ok(None) => BookingFlowState::default(),
        Err(error) => {
            tracing::warn!(%error, "ignoring unreadable draft snapshot");
            BookingFlowState::default()
        },
    }
}

/// Injected dependencies for the booking flow
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Backend API client
    pub api: Arc<dyn BookingApi>,
    /// Durable draft snapshot storage
    pub drafts: Arc<dyn DraftStore>,
    /// Clock for snapshot timestamps
    pub clock: Arc<dyn Clock>,
    /// Payment status polling schedule
    pub polling: PollingPolicy,
}

impl BookingEnvironment {
    /// Create an environment with the default polling schedule
    #[must_use]
    pub fn new(
        api: Arc<dyn BookingApi>,
        drafts: Arc<dyn DraftStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            drafts,
            clock,
            polling: PollingPolicy::default(),
        }
    }

    /// Override the polling schedule (tests shrink the delays)
    #[must_use]
    pub fn with_polling(mut self, polling: PollingPolicy) -> Self {
        self.polling = polling;
        self
    }
}

/// Reducer implementing the booking wizard and payment flow
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new booking reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

impl Reducer for BookingReducer {
    type State = BookingFlowState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action keeps the transition table in one place
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            // ========== Draft mutations ==========
            BookingAction::SetSalon(salon) => {
                state.draft.salon = Some(salon);
                state.last_error = None;
                persist_draft(state, env)
            },
            BookingAction::AddService(service) => {
                state.draft.add_service(service);
                state.last_error = None;
                persist_draft(state, env)
            },
            BookingAction::RemoveService(id) => {
                state.draft.remove_service(&id);
                persist_draft(state, env)
            },
            BookingAction::SetDate(date) => {
                state.draft.date = Some(date);
                persist_draft(state, env)
            },
            BookingAction::SetTime(time) => {
                state.draft.time = Some(time);
                persist_draft(state, env)
            },
            BookingAction::SetClientDetails {
                first_name,
                last_name,
                phone,
                address,
            } => {
                state.draft.client_first_name = Some(first_name);
                state.draft.client_last_name = Some(last_name);
                state.draft.client_phone = Some(phone);
                state.draft.client_address = address;
                persist_draft(state, env)
            },
            BookingAction::SetNotes(notes) => {
                state.draft.notes = Some(notes);
                persist_draft(state, env)
            },

            // ========== Wizard transitions ==========
            BookingAction::NextStep => match state.draft.guard_advance() {
                Ok(()) => {
                    state.draft.advance_step();
                    state.last_error = None;
                    persist_draft(state, env)
                },
                Err(error) => {
                    tracing::debug!(%error, step = state.draft.step, "wizard advance blocked");
                    state.last_error = Some(error.to_string());
                    smallvec![Effect::None]
                },
            },
            BookingAction::PrevStep => {
                if state.draft.step == FIRST_STEP {
                    // Leaving the wizard entirely; observers navigate back
                    smallvec![feedback(BookingAction::ExitRequested)]
                } else {
                    state.draft.retreat_step();
                    persist_draft(state, env)
                }
            },
            BookingAction::SetStep(step) => {
                state.draft.set_step(step);
                persist_draft(state, env)
            },
            BookingAction::ExitRequested => smallvec![Effect::None],

            BookingAction::SetBookingId(id) => {
                // Set exactly once; a repeat confirms the same id
                if state.draft.booking_id.is_none() {
                    state.draft.booking_id = Some(id);
                }
                state.last_error = None;
                persist_draft(state, env)
            },

            BookingAction::ResetBooking => {
                state.draft = BookingDraft::default();
                state.payment = PaymentAttempt::default();
                state.last_error = None;
                smallvec![clear_snapshot(env)]
            },

            // ========== Appointment submission ==========
            BookingAction::SubmitAppointment => submit_appointment(state, env),
            BookingAction::SubmissionFailed { reason } => {
                tracing::warn!(%reason, "appointment submission failed");
                state.last_error = Some(reason);
                smallvec![Effect::None]
            },

            // ========== Payment ==========
            BookingAction::SelectPaymentMethod(method) => {
                state.payment.method = Some(method);
                state.payment.last_failure = None;
                state.last_error = None;
                smallvec![Effect::None]
            },
            BookingAction::SetPaymentPhone(number) => {
                state.payment.phone_number = Some(number);
                smallvec![Effect::None]
            },
            BookingAction::StartPayment => start_payment(state, env),

            BookingAction::PaymentRejected { reason } => {
                state.payment.status = PaymentStatus::Idle;
                state.payment.last_failure = Some(PaymentFailure::Rejected {
                    reason: reason.clone(),
                });
                state.last_error = Some(reason);
                smallvec![Effect::None]
            },
            BookingAction::PaymentInitFailed { reason } => {
                if state.payment.status != PaymentStatus::Processing {
                    return smallvec![Effect::None];
                }
                tracing::warn!(%reason, "payment init failed");
                state.payment.status = PaymentStatus::Idle;
                state.payment.last_failure = Some(PaymentFailure::Network {
                    reason: reason.clone(),
                });
                state.last_error = Some(reason);
                smallvec![Effect::None]
            },
            BookingAction::PaymentInitiated {
                payment_id,
                checkout_url,
            } => {
                if state.payment.status != PaymentStatus::Processing {
                    // The attempt was abandoned while the init call was in flight
                    return smallvec![Effect::None];
                }
                tracing::info!(%payment_id, "payment initiated, polling for confirmation");
                state.payment.status = PaymentStatus::PendingConfirmation;
                state.payment.provider_payment_id = Some(payment_id);
                state.payment.checkout_url = checkout_url;
                state.payment.attempts = 0;
                smallvec![
                    Effect::Delay {
                        duration: env.polling.initial_delay(),
                        action: Box::new(BookingAction::CheckPaymentStatus { attempt: 1 }),
                    }
                    .cancellable(poll_effect_id())
                ]
            },

            BookingAction::CheckPaymentStatus { attempt } => {
                check_payment_status(state, env, attempt)
            },
            BookingAction::PaymentStatusFetched { attempt, status } => {
                on_status_fetched(state, env, attempt, &status)
            },
            BookingAction::PaymentPollFailed { attempt, reason } => {
                if state.payment.status != PaymentStatus::PendingConfirmation {
                    return smallvec![Effect::None];
                }
                // Transport errors are not provider verdicts; keep polling
                // within the same attempt budget
                tracing::warn!(attempt, %reason, "payment status check failed, continuing");
                continue_or_timeout(env, attempt)
            },

            BookingAction::PaymentCompleted { booking_id, .. } => {
                // Terminal success: the draft lifecycle ends here
                tracing::info!(%booking_id, "payment completed, clearing draft");
                state.payment.status = PaymentStatus::Completed;
                state.payment.last_failure = None;
                state.draft = BookingDraft::default();
                state.last_error = None;
                smallvec![clear_snapshot(env)]
            },
            BookingAction::PaymentFailed { reason } => {
                if state.payment.status != PaymentStatus::PendingConfirmation {
                    return smallvec![Effect::None];
                }
                tracing::warn!(%reason, "payment declined by provider");
                state.payment.status = PaymentStatus::Failed;
                state.payment.last_failure = Some(PaymentFailure::Declined {
                    reason: reason.clone(),
                });
                state.last_error = Some(reason);
                smallvec![Effect::None]
            },
            BookingAction::PaymentTimedOut => {
                if state.payment.status != PaymentStatus::PendingConfirmation {
                    return smallvec![Effect::None];
                }
                tracing::warn!(
                    attempts = state.payment.attempts,
                    "payment confirmation timed out"
                );
                state.payment.status = PaymentStatus::Idle;
                state.payment.last_failure = Some(PaymentFailure::TimedOut);
                state.last_error = Some(PaymentFailure::TimedOut.to_string());
                smallvec![Effect::None]
            },

            BookingAction::DismissPayment => {
                if state.payment.status != PaymentStatus::PendingConfirmation {
                    return smallvec![Effect::None];
                }
                // Stops the timer chain; the provider-side payment is untouched
                tracing::info!("payment confirmation dismissed, stopping polling");
                state.payment.status = PaymentStatus::Idle;
                smallvec![Effect::Cancel(poll_effect_id())]
            },
            BookingAction::ClearPaymentError => {
                if state.payment.status == PaymentStatus::Failed {
                    state.payment.status = PaymentStatus::Idle;
                }
                state.payment.last_failure = None;
                state.last_error = None;
                smallvec![Effect::None]
            },
        }
    }
}

/// Wrap an action so it is fed back (and broadcast) through the store
fn feedback(action: BookingAction) -> Effect<BookingAction> {
    Effect::Future(Box::pin(async move { Some(action) }))
}

/// Snapshot the draft after a mutation, once it has progress
///
/// Persistence failures are logged, not surfaced: losing resumability must
/// not break the booking in progress.
fn persist_draft(state: &BookingFlowState, env: &BookingEnvironment) -> Effects {
    if !state.draft.has_progress() {
        return smallvec![Effect::None];
    }
    let snapshot = DraftSnapshot::new(state.draft.clone(), env.clock.now());
    let drafts = Arc::clone(&env.drafts);
    smallvec![Effect::Future(Box::pin(async move {
        if let Err(error) = drafts.save(snapshot).await {
            tracing::warn!(%error, "failed to persist draft snapshot");
        }
        None
    }))]
}

/// Remove the persisted snapshot (reset and payment completion)
fn clear_snapshot(env: &BookingEnvironment) -> Effect<BookingAction> {
    let drafts = Arc::clone(&env.drafts);
    Effect::Future(Box::pin(async move {
        if let Err(error) = drafts.clear().await {
            tracing::warn!(%error, "failed to clear draft snapshot");
        }
        None
    }))
}

/// Create the backend appointment, reusing a previously returned id
fn submit_appointment(state: &BookingFlowState, env: &BookingEnvironment) -> Effects {
    if let Some(id) = state.draft.booking_id.clone() {
        // Already created for this draft lifecycle: no second appointment,
        // no network call
        tracing::debug!(booking_id = %id, "appointment already created, reusing id");
        return smallvec![feedback(BookingAction::SetBookingId(id))];
    }

    match build_appointment_request(&state.draft) {
        Ok(request) => {
            let api = Arc::clone(&env.api);
            smallvec![Effect::Future(Box::pin(async move {
                match api.create_appointment(request).await {
                    Ok(id) => Some(BookingAction::SetBookingId(id)),
                    Err(error) => Some(BookingAction::SubmissionFailed {
                        reason: error.to_string(),
                    }),
                }
            }))]
        },
        Err(error) => smallvec![feedback(BookingAction::SubmissionFailed {
            reason: error.to_string(),
        })],
    }
}

/// Validate the draft and materialize the creation request
///
/// Fails fast on the first missing requirement; nothing is sent until the
/// draft is complete.
fn build_appointment_request(
    draft: &BookingDraft,
) -> Result<CreateAppointmentRequest, ValidationError> {
    let salon = draft.salon.as_ref().ok_or(ValidationError::NoSalon)?;
    let primary = draft.services.first().ok_or(ValidationError::NoServices)?;
    let date = required(draft.date.as_deref()).ok_or(ValidationError::MissingDate)?;
    let time = required(draft.time.as_deref()).ok_or(ValidationError::MissingTime)?;
    let first_name =
        required(draft.client_first_name.as_deref()).ok_or(ValidationError::MissingFirstName)?;
    let last_name =
        required(draft.client_last_name.as_deref()).ok_or(ValidationError::MissingLastName)?;
    let contact_phone =
        required(draft.client_phone.as_deref()).ok_or(ValidationError::MissingPhone)?;

    Ok(CreateAppointmentRequest {
        salon_id: salon.id.clone(),
        service_id: primary.id.clone(),
        service_ids: draft.services.iter().map(|s| s.id.clone()).collect(),
        date: date.to_string(),
        start_time: time.to_string(),
        notes: draft.combined_notes(),
        client_first_name: first_name.to_string(),
        client_last_name: last_name.to_string(),
        client_phone: contact_phone.to_string(),
        client_address: required(draft.client_address.as_deref()).map(ToOwned::to_owned),
        coiffeur_id: None,
    })
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Entry point of the payment state machine
fn start_payment(state: &mut BookingFlowState, env: &BookingEnvironment) -> Effects {
    if matches!(
        state.payment.status,
        PaymentStatus::Processing | PaymentStatus::PendingConfirmation | PaymentStatus::Completed
    ) {
        // An attempt is already in flight or done; ignore the duplicate
        return smallvec![Effect::None];
    }

    let Some(method) = state.payment.method else {
        return smallvec![feedback(BookingAction::PaymentRejected {
            reason: ValidationError::NoPaymentMethod.to_string(),
        })];
    };
    let Some(booking_id) = state.draft.booking_id.clone() else {
        return smallvec![feedback(BookingAction::PaymentRejected {
            reason: ValidationError::MissingAppointment.to_string(),
        })];
    };

    // The deposit, never the full price, is what gets charged upfront
    let deposit = BookingSummary::project(&state.draft).deposit;

    if method == PaymentMethod::PayOnSite {
        state.payment.status = PaymentStatus::Processing;
        state.payment.last_failure = None;
        state.last_error = None;
        let api = Arc::clone(&env.api);
        return smallvec![Effect::Future(Box::pin(async move {
            match api.confirm_on_site(deposit, booking_id.clone()).await {
                Ok(()) => Some(BookingAction::PaymentCompleted {
                    booking_id,
                    payment_id: None,
                }),
                Err(error) => Some(BookingAction::PaymentInitFailed {
                    reason: error.to_string(),
                }),
            }
        }))];
    }

    // Mobile money: the wallet number must normalize before anything is sent
    let Some(raw_number) = state.payment.phone_number.clone() else {
        return smallvec![feedback(BookingAction::PaymentRejected {
            reason: ValidationError::MissingPaymentPhone.to_string(),
        })];
    };
    let wallet_number = match phone::normalize(&raw_number) {
        Ok(number) => number,
        Err(error) => {
            return smallvec![feedback(BookingAction::PaymentRejected {
                reason: error.to_string(),
            })];
        },
    };

    state.payment.status = PaymentStatus::Processing;
    state.payment.last_failure = None;
    state.last_error = None;

    let request = InitPaymentRequest {
        provider: method.provider_code().to_string(),
        amount: deposit,
        phone_number: Some(wallet_number),
        booking_id,
    };
    let api = Arc::clone(&env.api);
    smallvec![Effect::Future(Box::pin(async move {
        match api.init_payment(request).await {
            Ok(initiation) => Some(BookingAction::PaymentInitiated {
                payment_id: initiation.payment_id,
                checkout_url: initiation.checkout_url,
            }),
            Err(error) => Some(BookingAction::PaymentInitFailed {
                reason: error.to_string(),
            }),
        }
    }))]
}

/// One polling tick: fetch the provider status by id
fn check_payment_status(
    state: &mut BookingFlowState,
    env: &BookingEnvironment,
    attempt: u32,
) -> Effects {
    if state.payment.status != PaymentStatus::PendingConfirmation {
        // Dismissed or finished while the tick was pending
        return smallvec![Effect::None];
    }
    let Some(payment_id) = state.payment.provider_payment_id.clone() else {
        return smallvec![Effect::None];
    };

    state.payment.attempts = attempt;
    tracing::debug!(%payment_id, attempt, "checking payment status");

    let api = Arc::clone(&env.api);
    smallvec![Effect::Future(Box::pin(async move {
        match api.payment_status(payment_id).await {
            Ok(status) => Some(BookingAction::PaymentStatusFetched { attempt, status }),
            Err(error) => Some(BookingAction::PaymentPollFailed {
                attempt,
                reason: error.to_string(),
            }),
        }
    }))]
}

/// React to a fetched provider status
fn on_status_fetched(
    state: &BookingFlowState,
    env: &BookingEnvironment,
    attempt: u32,
    status: &ProviderPaymentStatus,
) -> Effects {
    if state.payment.status != PaymentStatus::PendingConfirmation {
        // A stale result arriving after dismissal is ignored; the user
        // re-checks out-of-band
        return smallvec![Effect::None];
    }

    match status {
        ProviderPaymentStatus::Completed => {
            let Some(booking_id) = state.draft.booking_id.clone() else {
                tracing::error!("payment completed without a booking id on the draft");
                return smallvec![Effect::None];
            };
            smallvec![feedback(BookingAction::PaymentCompleted {
                booking_id,
                payment_id: state.payment.provider_payment_id.clone(),
            })]
        },
        ProviderPaymentStatus::Failed => smallvec![feedback(BookingAction::PaymentFailed {
            reason: "the payment was declined by the provider".to_string(),
        })],
        ProviderPaymentStatus::Pending(raw) => {
            tracing::debug!(attempt, status = %raw, "payment still pending");
            continue_or_timeout(env, attempt)
        },
    }
}

/// Schedule the next tick, or surface a timeout once the budget is spent
fn continue_or_timeout(env: &BookingEnvironment, attempt: u32) -> Effects {
    if env.polling.budget_exhausted(attempt) {
        smallvec![feedback(BookingAction::PaymentTimedOut)]
    } else {
        smallvec![
            Effect::Delay {
                duration: env.polling.interval(),
                action: Box::new(BookingAction::CheckPaymentStatus {
                    attempt: attempt + 1,
                }),
            }
            .cancellable(poll_effect_id())
        ]
    }
}
