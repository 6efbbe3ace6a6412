//! Payment attempt state machine and polling schedule.

use crate::types::PaymentId;
use salonflow_core::effect::EffectId;
use std::fmt;
use std::time::Duration;

/// How the client pays the deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Wave mobile money
    Wave,
    /// Orange Money mobile money
    OrangeMoney,
    /// Pay the deposit at the salon
    PayOnSite,
}

impl PaymentMethod {
    /// Provider code sent to the payment init endpoint
    #[must_use]
    pub const fn provider_code(self) -> &'static str {
        match self {
            Self::Wave => "wave",
            Self::OrangeMoney => "orange_money",
            Self::PayOnSite => "on_site",
        }
    }

    /// Whether this method settles asynchronously through a mobile wallet
    ///
    /// Mobile money methods require a wallet phone number and a status
    /// polling phase; pay-on-site confirms synchronously.
    #[must_use]
    pub const fn is_mobile_money(self) -> bool {
        !matches!(self, Self::PayOnSite)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wave => write!(f, "Wave"),
            Self::OrangeMoney => write!(f, "Orange Money"),
            Self::PayOnSite => write!(f, "Pay at the salon"),
        }
    }
}

/// Status of the current payment attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentStatus {
    /// No attempt in flight
    #[default]
    Idle,
    /// Init or confirmation call in flight
    Processing,
    /// Waiting for the provider to confirm; status polling is active
    PendingConfirmation,
    /// Provider confirmed the payment
    Completed,
    /// Provider reported a terminal failure
    Failed,
}

/// Why a payment attempt ended without success
///
/// The three non-success outcomes behave differently: a rejection never left
/// the process, a network failure is worth retrying as-is, a decline is the
/// provider's verdict, and a timeout is ambiguous (the payment may still
/// complete out-of-band).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentFailure {
    /// Rejected client-side before any network call
    Rejected {
        /// Validation message
        reason: String,
    },
    /// Transport or backend error on the init/confirmation call
    Network {
        /// Error message
        reason: String,
    },
    /// Provider-reported terminal failure
    Declined {
        /// Provider message
        reason: String,
    },
    /// The polling attempt budget was exhausted
    TimedOut,
}

impl fmt::Display for PaymentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { reason } | Self::Network { reason } | Self::Declined { reason } => {
                write!(f, "{reason}")
            },
            Self::TimedOut => write!(
                f,
                "the payment confirmation timed out; check your wallet and try again"
            ),
        }
    }
}

/// Payment status reported by the provider through the status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPaymentStatus {
    /// Terminal success
    Completed,
    /// Terminal failure
    Failed,
    /// Any non-terminal status, carrying the raw wire value
    Pending(String),
}

impl ProviderPaymentStatus {
    /// Map a raw wire status onto the terminal/non-terminal split
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            other => Self::Pending(other.to_string()),
        }
    }

    /// Whether this status ends the polling loop
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Transient state of the current payment attempt
///
/// Unlike the booking draft this is never persisted; a process restart
/// abandons the attempt (the provider-side payment is unaffected).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentAttempt {
    /// Chosen payment method
    pub method: Option<PaymentMethod>,
    /// Wallet phone number as entered (normalized at init time)
    pub phone_number: Option<String>,
    /// Current attempt status
    pub status: PaymentStatus,
    /// Polling key returned by the init call
    pub provider_payment_id: Option<PaymentId>,
    /// Checkout URL returned by the init call, if the provider uses one
    pub checkout_url: Option<String>,
    /// Status checks performed so far
    pub attempts: u32,
    /// Why the last attempt ended, if it did not succeed
    pub last_failure: Option<PaymentFailure>,
}

/// Scheduling parameters for the payment status polling loop
///
/// Defaults: first check after 5 seconds, then every 10 seconds, at most 30
/// attempts (about five minutes in total).
///
/// # Example
///
/// ```
/// use salonflow_booking::payment::PollingPolicy;
/// use std::time::Duration;
///
/// let policy = PollingPolicy::new()
///     .with_initial_delay(Duration::from_millis(10))
///     .with_interval(Duration::from_millis(10))
///     .with_max_attempts(3);
/// assert_eq!(policy.max_attempts(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PollingPolicy {
    /// Delay before the first status check
    initial_delay: Duration,

    /// Delay between subsequent checks
    interval: Duration,

    /// Maximum number of status checks before surfacing a timeout
    max_attempts: u32,
}

impl PollingPolicy {
    /// Create a polling policy with the default schedule
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            interval: Duration::from_secs(10),
            max_attempts: 30,
        }
    }

    /// Set the delay before the first status check
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay between subsequent checks
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the maximum number of status checks
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Delay before the first status check
    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Delay between subsequent checks
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Maximum number of status checks
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the given (1-based) attempt was the last one allowed
    #[must_use]
    pub const fn budget_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation id under which the scheduled status check is registered
///
/// Dismissing the pending-confirmation state cancels this id, which aborts
/// the pending timer without touching the provider-side payment.
#[must_use]
pub fn poll_effect_id() -> EffectId {
    EffectId::new("payment-status-poll")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_status_mapping() {
        assert_eq!(
            ProviderPaymentStatus::from_wire("COMPLETED"),
            ProviderPaymentStatus::Completed
        );
        assert_eq!(
            ProviderPaymentStatus::from_wire("FAILED"),
            ProviderPaymentStatus::Failed
        );
        assert_eq!(
            ProviderPaymentStatus::from_wire("PENDING"),
            ProviderPaymentStatus::Pending("PENDING".to_string())
        );
        assert!(ProviderPaymentStatus::from_wire("COMPLETED").is_terminal());
        assert!(!ProviderPaymentStatus::from_wire("INITIATED").is_terminal());
    }

    #[test]
    fn polling_budget() {
        let policy = PollingPolicy::new().with_max_attempts(30);
        assert!(!policy.budget_exhausted(29));
        assert!(policy.budget_exhausted(30));
    }

    #[test]
    fn default_schedule() {
        let policy = PollingPolicy::default();
        assert_eq!(policy.initial_delay(), Duration::from_secs(5));
        assert_eq!(policy.interval(), Duration::from_secs(10));
        assert_eq!(policy.max_attempts(), 30);
    }

    #[test]
    fn method_capabilities() {
        assert!(PaymentMethod::Wave.is_mobile_money());
        assert!(PaymentMethod::OrangeMoney.is_mobile_money());
        assert!(!PaymentMethod::PayOnSite.is_mobile_money());
        assert_eq!(PaymentMethod::OrangeMoney.provider_code(), "orange_money");
    }
}
