//! # Salonflow Booking
//!
//! The salon booking flow: a multi-step wizard accumulating service
//! selections, schedule, and client details, followed by an idempotent
//! appointment submission and a deposit payment with provider status
//! polling.
//!
//! ## Architecture
//!
//! The flow is a single reducer ([`BookingReducer`]) over
//! [`BookingFlowState`], driven through the store runtime:
//!
//! - draft mutations recompute derived totals and snapshot the draft to
//!   durable storage on every mutation boundary;
//! - wizard transitions are guarded per step and never run automatically;
//! - `SubmitAppointment` creates at most one backend appointment per draft
//!   lifecycle, reusing the returned id on retries;
//! - `StartPayment` charges the deposit (not the full price) and, for mobile
//!   money methods, polls the provider status on a bounded, cancellable
//!   schedule.
//!
//! ## Example
//!
//! ```ignore
//! use salonflow_booking::{rehydrate, BookingAction, BookingEnvironment, BookingReducer};
//! use salonflow_booking::api::HttpBookingApi;
//! use salonflow_booking::storage::FileDraftStore;
//! use salonflow_core::environment::SystemClock;
//! use salonflow_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = BookingEnvironment::new(
//!     Arc::new(HttpBookingApi::new("https://api.example.test")),
//!     Arc::new(FileDraftStore::new("booking-draft.json")),
//!     Arc::new(SystemClock),
//! );
//! let initial = rehydrate(env.drafts.as_ref()).await;
//! let store = Store::new(initial, BookingReducer::new(), env);
//!
//! store.send(BookingAction::NextStep).await?;
//! # Ok(())
//! # }
//! ```

/// Booking flow actions
pub mod action;
/// Backend API boundary
pub mod api;
/// The reservation draft and its snapshot
pub mod draft;
/// Client-side validation errors
pub mod error;
/// Payment attempt state machine and polling schedule
pub mod payment;
/// Mobile number normalization
pub mod phone;
/// Price and deposit projection
pub mod pricing;
/// The booking reducer and its environment
pub mod reducer;
/// Durable draft storage
pub mod storage;
/// Core domain types
pub mod types;

pub use action::BookingAction;
pub use draft::{BookingDraft, DraftSnapshot};
pub use payment::{PaymentAttempt, PaymentFailure, PaymentMethod, PaymentStatus, PollingPolicy};
pub use pricing::{BookingSummary, DEFAULT_DEPOSIT_PERCENTAGE};
pub use reducer::{BookingEnvironment, BookingFlowState, BookingReducer, rehydrate};
