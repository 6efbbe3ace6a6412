//! Validation errors surfaced before any network call.

use thiserror::Error;

/// Client-side validation failures
///
/// These are detected before any request leaves the process and are surfaced
/// inline; they are never sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No salon attached to the draft
    #[error("no salon selected")]
    NoSalon,

    /// The service selection is empty
    #[error("select at least one service")]
    NoServices,

    /// The appointment date is missing
    #[error("an appointment date is required")]
    MissingDate,

    /// The appointment time is missing
    #[error("an appointment time is required")]
    MissingTime,

    /// The client first name is missing
    #[error("the client first name is required")]
    MissingFirstName,

    /// The client last name is missing
    #[error("the client last name is required")]
    MissingLastName,

    /// The client contact phone is missing
    #[error("a contact phone number is required")]
    MissingPhone,

    /// The phone number does not normalize to a recognized mobile number
    #[error("`{0}` is not a valid mobile number")]
    InvalidPhone(String),

    /// No payment method chosen
    #[error("select a payment method")]
    NoPaymentMethod,

    /// Mobile money payment requested without a wallet phone number
    #[error("a mobile money phone number is required")]
    MissingPaymentPhone,

    /// Payment requested before the appointment was created
    #[error("the appointment has not been created yet")]
    MissingAppointment,
}
