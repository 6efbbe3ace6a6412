//! Core domain types for the booking flow.

use salonflow_core::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a salon
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalonId(String);

impl SalonId {
    /// Creates a new `SalonId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SalonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a salon service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a new `ServiceId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a created appointment
///
/// Returned by the backend on creation and reused as the idempotency key for
/// the rest of the draft lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentId(String);

impl AppointmentId {
    /// Creates a new `AppointmentId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque payment identifier returned by the payment init endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(String);

impl PaymentId {
    /// Creates a new `PaymentId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount in CFA francs
///
/// The franc has no minor unit, so amounts are whole integers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Zero francs
    pub const ZERO: Self = Self(0);

    /// Creates a new money amount from francs
    #[must_use]
    pub const fn from_francs(francs: i64) -> Self {
        Self(francs)
    }

    /// Returns the value in francs
    #[must_use]
    pub const fn francs(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} F", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

/// Read-only salon summary owned by the draft
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalonSummary {
    /// Salon identifier
    pub id: SalonId,
    /// Display name
    pub name: String,
    /// Street address, if known
    pub address: Option<String>,
    /// Deposit percentage configured by the salon; falls back to the default
    /// when absent
    pub deposit_percentage: Option<u8>,
}

/// A selected service line item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Service identifier
    pub id: ServiceId,
    /// Display name
    pub name: String,
    /// Price of the service
    pub price: Money,
    /// Expected duration in minutes
    pub duration_minutes: u32,
}

impl ServiceItem {
    /// Creates a new service line item
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: ServiceId::new(id),
            name: name.into(),
            price,
            duration_minutes,
        }
    }
}
