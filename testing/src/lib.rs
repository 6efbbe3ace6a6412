//! # Salonflow Testing
//!
//! Testing utilities and mocks for the Salonflow booking engine:
//!
//! - [`mocks::FixedClock`] / [`mocks::test_clock`]: deterministic time
//! - [`mocks::MockBookingApi`]: scripted backend responses with call counters
//! - [`mocks::InMemoryDraftStore`]: snapshot storage without a filesystem
//!
//! ## Example
//!
//! ```ignore
//! use salonflow_booking::{BookingEnvironment, BookingFlowState, BookingReducer};
//! use salonflow_testing::mocks::{test_clock, InMemoryDraftStore, MockBookingApi};
//! use salonflow_runtime::Store;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_booking_flow() {
//!     let api = Arc::new(MockBookingApi::default());
//!     let env = BookingEnvironment::new(
//!         Arc::clone(&api) as _,
//!         Arc::new(InMemoryDraftStore::default()),
//!         Arc::new(test_clock()),
//!     );
//!     let store = Store::new(BookingFlowState::default(), BookingReducer::new(), env);
//!     // drive the store ...
//! }
//! ```

/// Mock implementations of the booking environment traits
pub mod mocks {
    use chrono::{DateTime, Utc};
    use salonflow_booking::api::{
        ApiError, BookingApi, CreateAppointmentRequest, InitPaymentRequest, PaymentInitiation,
    };
    use salonflow_booking::draft::DraftSnapshot;
    use salonflow_booking::payment::ProviderPaymentStatus;
    use salonflow_booking::storage::{DraftStore, StorageError};
    use salonflow_booking::types::{AppointmentId, Money, PaymentId};
    use salonflow_core::environment::Clock;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use salonflow_testing::mocks::FixedClock;
    /// use salonflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Scripted implementation of [`BookingApi`]
    ///
    /// Defaults to succeeding: appointment `apt-1`, payment `pay-1`, and an
    /// endless `PENDING` status stream. Builders script failures, ids, and a
    /// finite status sequence; accessors expose call counts and the recorded
    /// requests so tests can assert what actually went over the wire.
    #[derive(Debug, Default)]
    pub struct MockBookingApi {
        appointment_id: Mutex<Option<String>>,
        payment_id: Mutex<Option<String>>,
        checkout_url: Mutex<Option<String>>,
        create_failure: Mutex<Option<String>>,
        confirm_failure: Mutex<Option<String>>,
        init_failure: Mutex<Option<String>>,
        statuses: Mutex<VecDeque<ProviderPaymentStatus>>,
        create_requests: Mutex<Vec<CreateAppointmentRequest>>,
        confirm_requests: Mutex<Vec<(Money, AppointmentId)>>,
        init_requests: Mutex<Vec<InitPaymentRequest>>,
        create_calls: AtomicUsize,
        confirm_calls: AtomicUsize,
        init_calls: AtomicUsize,
        status_calls: AtomicUsize,
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
    impl MockBookingApi {
        /// Script the appointment id returned on creation
        #[must_use]
        pub fn with_appointment_id(self, id: impl Into<String>) -> Self {
            *self.appointment_id.lock().unwrap() = Some(id.into());
            self
        }

        /// Script the payment id returned on init
        #[must_use]
        pub fn with_payment_id(self, id: impl Into<String>) -> Self {
            *self.payment_id.lock().unwrap() = Some(id.into());
            self
        }

        /// Script the checkout URL returned on init
        #[must_use]
        pub fn with_checkout_url(self, url: impl Into<String>) -> Self {
            *self.checkout_url.lock().unwrap() = Some(url.into());
            self
        }

        /// Script the provider statuses returned by consecutive checks
        ///
        /// Once the sequence is exhausted, further checks report `PENDING`.
        #[must_use]
        pub fn with_statuses(
            self,
            statuses: impl IntoIterator<Item = ProviderPaymentStatus>,
        ) -> Self {
            self.statuses.lock().unwrap().extend(statuses);
            self
        }

        /// Make appointment creation fail with the given backend message
        #[must_use]
        pub fn failing_create(self, message: impl Into<String>) -> Self {
            *self.create_failure.lock().unwrap() = Some(message.into());
            self
        }

        /// Make on-site confirmation fail with the given backend message
        #[must_use]
        pub fn failing_confirm(self, message: impl Into<String>) -> Self {
            *self.confirm_failure.lock().unwrap() = Some(message.into());
            self
        }

        /// Make payment init fail with the given backend message
        #[must_use]
        pub fn failing_init(self, message: impl Into<String>) -> Self {
            *self.init_failure.lock().unwrap() = Some(message.into());
            self
        }

        /// Number of appointment creation calls performed
        #[must_use]
        pub fn create_appointment_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }

        /// Number of on-site confirmation calls performed
        #[must_use]
        pub fn confirm_on_site_calls(&self) -> usize {
            self.confirm_calls.load(Ordering::SeqCst)
        }

        /// Number of payment init calls performed
        #[must_use]
        pub fn init_payment_calls(&self) -> usize {
            self.init_calls.load(Ordering::SeqCst)
        }

        /// Number of status checks performed
        #[must_use]
        pub fn payment_status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        /// Recorded appointment creation requests
        #[must_use]
        pub fn create_requests(&self) -> Vec<CreateAppointmentRequest> {
            self.create_requests.lock().unwrap().clone()
        }

        /// Recorded on-site confirmations as `(amount, booking id)` pairs
        #[must_use]
        pub fn confirm_requests(&self) -> Vec<(Money, AppointmentId)> {
            self.confirm_requests.lock().unwrap().clone()
        }

        /// Recorded payment init requests
        #[must_use]
        pub fn init_requests(&self) -> Vec<InitPaymentRequest> {
            self.init_requests.lock().unwrap().clone()
        }

        fn backend_error(message: String) -> ApiError {
            ApiError::Backend {
                status: 400,
                message,
            }
        }
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
    impl BookingApi for MockBookingApi {
        fn create_appointment(
            &self,
            request: CreateAppointmentRequest,
        ) -> Pin<Box<dyn Future<Output = Result<AppointmentId, ApiError>> + Send + '_>> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.create_requests.lock().unwrap().push(request);
            let result = match self.create_failure.lock().unwrap().clone() {
                Some(message) => Err(Self::backend_error(message)),
                None => Ok(AppointmentId::new(
                    self.appointment_id
                        .lock()
                        .unwrap()
                        .clone()
                        .unwrap_or_else(|| "apt-1".to_string()),
                )),
            };
            Box::pin(async move { result })
        }

        fn confirm_on_site(
            &self,
            amount: Money,
            booking_id: AppointmentId,
        ) -> Pin<Box<dyn Future<Output = Result<(), ApiError>> + Send + '_>> {
            self.confirm_calls.fetch_add(1, Ordering::SeqCst);
            self.confirm_requests.lock().unwrap().push((amount, booking_id));
            let result = match self.confirm_failure.lock().unwrap().clone() {
                Some(message) => Err(Self::backend_error(message)),
                None => Ok(()),
            };
            Box::pin(async move { result })
        }

        fn init_payment(
            &self,
            request: InitPaymentRequest,
        ) -> Pin<Box<dyn Future<Output = Result<PaymentInitiation, ApiError>> + Send + '_>> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            self.init_requests.lock().unwrap().push(request);
            let result = match self.init_failure.lock().unwrap().clone() {
                Some(message) => Err(Self::backend_error(message)),
                None => Ok(PaymentInitiation {
                    payment_id: PaymentId::new(
                        self.payment_id
                            .lock()
                            .unwrap()
                            .clone()
                            .unwrap_or_else(|| "pay-1".to_string()),
                    ),
                    checkout_url: self.checkout_url.lock().unwrap().clone(),
                }),
            };
            Box::pin(async move { result })
        }

        fn payment_status(
            &self,
            _payment_id: PaymentId,
        ) -> Pin<Box<dyn Future<Output = Result<ProviderPaymentStatus, ApiError>> + Send + '_>>
        {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ProviderPaymentStatus::Pending("PENDING".to_string()));
            Box::pin(async move { Ok(status) })
        }
    }

    /// In-memory implementation of [`DraftStore`]
    ///
    /// Holds at most one snapshot, exactly like the file-backed store, and
    /// counts saves so tests can assert persistence boundaries.
    #[derive(Debug, Default)]
    pub struct InMemoryDraftStore {
        snapshot: Mutex<Option<DraftSnapshot>>,
        save_calls: AtomicUsize,
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
    impl InMemoryDraftStore {
        /// Create a store pre-seeded with a snapshot
        #[must_use]
        pub fn with_snapshot(snapshot: DraftSnapshot) -> Self {
            let store = Self::default();
            *store.snapshot.lock().unwrap() = Some(snapshot);
            store
        }

        /// The currently held snapshot, if any
        #[must_use]
        pub fn snapshot(&self) -> Option<DraftSnapshot> {
            self.snapshot.lock().unwrap().clone()
        }

        /// Number of saves performed
        #[must_use]
        pub fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable in tests
    impl DraftStore for InMemoryDraftStore {
        fn save(
            &self,
            snapshot: DraftSnapshot,
        ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            *self.snapshot.lock().unwrap() = Some(snapshot);
            Box::pin(async { Ok(()) })
        }

        fn load(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<Option<DraftSnapshot>, StorageError>> + Send + '_>>
        {
            let snapshot = self.snapshot.lock().unwrap().clone();
            Box::pin(async move { Ok(snapshot) })
        }

        fn clear(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
            *self.snapshot.lock().unwrap() = None;
            Box::pin(async { Ok(()) })
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, InMemoryDraftStore, MockBookingApi, test_clock};
