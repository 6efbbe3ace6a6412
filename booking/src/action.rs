//! The fixed action set of the booking flow.

use crate::payment::{PaymentMethod, ProviderPaymentStatus};
use crate::types::{AppointmentId, PaymentId, SalonSummary, ServiceId, ServiceItem};

/// Actions driving the booking flow
///
/// This enum combines user intents (wizard mutations, submission, payment
/// commands) with the feedback events produced by effects. Feedback events
/// are broadcast to observers, which is how a UI layer reacts to navigation
/// triggers such as [`BookingAction::ExitRequested`] or
/// [`BookingAction::PaymentCompleted`].
#[derive(Clone, Debug)]
pub enum BookingAction {
    // ========== Draft mutations ==========
    /// Attach the salon the booking is for
    SetSalon(SalonSummary),

    /// Add a service to the selection (idempotent by id)
    AddService(ServiceItem),

    /// Remove a service from the selection (no-op when absent)
    RemoveService(ServiceId),

    /// Set the appointment date (ISO calendar date)
    SetDate(String),

    /// Set the appointment start time (`"HH:MM"`)
    SetTime(String),

    /// Set the client contact fields
    SetClientDetails {
        /// Client first name
        first_name: String,
        /// Client last name
        last_name: String,
        /// Client contact phone
        phone: String,
        /// Client address (optional)
        address: Option<String>,
    },

    /// Set the free-text notes
    SetNotes(String),

    /// Advance the wizard, subject to the current step's guard
    NextStep,

    /// Go back one step; from the first step this requests leaving the wizard
    PrevStep,

    /// Jump to a step (clamped to the valid range)
    SetStep(u8),

    /// Record the backend appointment id (set exactly once)
    SetBookingId(AppointmentId),

    /// Reset the draft and clear the persisted snapshot
    ResetBooking,

    // ========== Wizard events ==========
    /// Event: the user backed out of the wizard from the first step
    ///
    /// Observers navigate back to the salon view; the draft is untouched.
    ExitRequested,

    // ========== Appointment submission ==========
    /// Create the backend appointment from the accumulated draft
    ///
    /// Idempotent: once a booking id is set, no further network call is made.
    SubmitAppointment,

    /// Event: appointment creation failed (validation or backend)
    SubmissionFailed {
        /// Human-readable message, surfaced verbatim
        reason: String,
    },

    // ========== Payment ==========
    /// Choose how to pay the deposit
    SelectPaymentMethod(PaymentMethod),

    /// Set the mobile wallet phone number
    SetPaymentPhone(String),

    /// Start the payment for the deposit amount
    StartPayment,

    /// Event: payment was rejected client-side, no network call was made
    PaymentRejected {
        /// Validation message
        reason: String,
    },

    /// Event: the init or confirmation call failed (transport or backend)
    PaymentInitFailed {
        /// Error message
        reason: String,
    },

    /// Event: the provider accepted the payment init
    PaymentInitiated {
        /// Polling key
        payment_id: PaymentId,
        /// Checkout URL, when the provider uses a redirect flow
        checkout_url: Option<String>,
    },

    /// Scheduled status check (1-based attempt counter)
    CheckPaymentStatus {
        /// Which attempt this is
        attempt: u32,
    },

    /// Event: a status check returned
    PaymentStatusFetched {
        /// Which attempt returned
        attempt: u32,
        /// The provider-reported status
        status: ProviderPaymentStatus,
    },

    /// Event: a status check failed in transport; polling continues
    PaymentPollFailed {
        /// Which attempt failed
        attempt: u32,
        /// Error message
        reason: String,
    },

    /// Event: terminal success; the draft is destroyed
    PaymentCompleted {
        /// The confirmed appointment
        booking_id: AppointmentId,
        /// Provider payment id (absent for pay-on-site)
        payment_id: Option<PaymentId>,
    },

    /// Event: the provider reported a terminal failure
    PaymentFailed {
        /// Human-readable message
        reason: String,
    },

    /// Event: the polling attempt budget was exhausted
    ///
    /// The outcome is ambiguous: the payment may still complete out-of-band.
    PaymentTimedOut,

    /// Dismiss the pending-confirmation state
    ///
    /// Stops the polling timer; the provider-side payment is not cancelled.
    DismissPayment,

    /// Clear the surfaced payment failure and return to idle
    ClearPaymentError,
}
