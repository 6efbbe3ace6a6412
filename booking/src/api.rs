//! Backend API boundary: the `BookingApi` trait and its HTTP implementation.
//!
//! The four consumed endpoints are fixed by the backend:
//!
//! - `POST /appointments`
//! - `POST /payments/confirm-on-site`
//! - `POST /payments/init`
//! - `GET /payments/{paymentId}/status`
//!
//! Responses arrive wrapped in a `{ "data": ... }` envelope with camelCase
//! fields; non-2xx bodies carry a `message` field which is surfaced verbatim.

use crate::payment::ProviderPaymentStatus;
use crate::types::{AppointmentId, Money, PaymentId, SalonId, ServiceId};
use salonflow_core::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from the backend API boundary
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, malformed body)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the request
    ///
    /// Carries the backend-provided message so the UI can surface it verbatim.
    #[error("{message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Backend-provided message
        message: String,
    },
}

/// Appointment creation request
///
/// The backend binds a single primary `service_id`; the full selection rides
/// along in `service_ids` and, past the first service, in the notes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// Salon the appointment is for
    pub salon_id: SalonId,
    /// Primary (first selected) service
    pub service_id: ServiceId,
    /// Every selected service
    pub service_ids: Vec<ServiceId>,
    /// ISO calendar date
    pub date: String,
    /// Start time as `"HH:MM"`
    pub start_time: String,
    /// Combined notes (free text plus the generated extra-services line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Client first name
    pub client_first_name: String,
    /// Client last name
    pub client_last_name: String,
    /// Client contact phone
    pub client_phone: String,
    /// Client address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    /// Preferred stylist; never set by this flow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coiffeur_id: Option<String>,
}

/// Payment init request for mobile money methods
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPaymentRequest {
    /// Provider code (`"wave"`, `"orange_money"`)
    pub provider: String,
    /// Deposit amount (not the full price)
    pub amount: Money,
    /// Normalized wallet phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// The appointment being paid for
    pub booking_id: AppointmentId,
}

/// Result of a successful payment init
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentInitiation {
    /// Polling key for the status endpoint
    pub payment_id: PaymentId,
    /// Checkout URL when the provider uses a redirect flow
    pub checkout_url: Option<String>,
}

/// Backend API consumed by the booking flow
///
/// Implemented by [`HttpBookingApi`] in production and by a scripted mock in
/// tests. Methods return boxed futures so the trait stays object-safe behind
/// `Arc<dyn BookingApi>`.
pub trait BookingApi: Send + Sync {
    /// Create an appointment from the accumulated draft
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Backend`] with the backend message on rejection,
    /// or [`ApiError::Transport`] on connection-level failures.
    fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AppointmentId, ApiError>> + Send + '_>>;

    /// Confirm a pay-on-site deposit for an appointment
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Backend`] or [`ApiError::Transport`] on failure.
    fn confirm_on_site(
        &self,
        amount: Money,
        booking_id: AppointmentId,
    ) -> Pin<Box<dyn Future<Output = Result<(), ApiError>> + Send + '_>>;

    /// Initiate a mobile money payment for the deposit amount
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Backend`] or [`ApiError::Transport`] on failure.
    fn init_payment(
        &self,
        request: InitPaymentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentInitiation, ApiError>> + Send + '_>>;

    /// Fetch the provider status of a payment
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Backend`] or [`ApiError::Transport`] on failure.
    fn payment_status(
        &self,
        payment_id: PaymentId,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderPaymentStatus, ApiError>> + Send + '_>>;
}

// ===== Wire shapes =====

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct AppointmentData {
    appointment: AppointmentBody,
}

#[derive(Deserialize)]
struct AppointmentBody {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitPaymentData {
    checkout_url: Option<String>,
    mock_checkout_url: Option<String>,
    payment_id: String,
}

#[derive(Deserialize)]
struct PaymentStatusData {
    payment: PaymentStatusBody,
}

#[derive(Deserialize)]
struct PaymentStatusBody {
    status: String,
}

#[derive(Deserialize)]
struct BackendMessage {
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmOnSiteRequest {
    amount: Money,
    booking_id: AppointmentId,
}

/// HTTP implementation of [`BookingApi`]
#[derive(Clone, Debug)]
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingApi {
    /// Create a client against the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T>(response: reqwest::Response) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendMessage>(&body)
                .ok()
                .and_then(|m| m.message)
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        format!("request failed with status {status}")
                    } else {
                        body.clone()
                    }
                });
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl BookingApi for HttpBookingApi {
    fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AppointmentId, ApiError>> + Send + '_>> {
        Box::pin(async move {
            let envelope: Envelope<AppointmentData> =
                self.post_json("/appointments", &request).await?;
            Ok(AppointmentId::new(envelope.data.appointment.id))
        })
    }

    fn confirm_on_site(
        &self,
        amount: Money,
        booking_id: AppointmentId,
    ) -> Pin<Box<dyn Future<Output = Result<(), ApiError>> + Send + '_>> {
        Box::pin(async move {
            let request = ConfirmOnSiteRequest { amount, booking_id };
            let _: Envelope<serde_json::Value> =
                self.post_json("/payments/confirm-on-site", &request).await?;
            Ok(())
        })
    }

    fn init_payment(
        &self,
        request: InitPaymentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentInitiation, ApiError>> + Send + '_>> {
        Box::pin(async move {
            let envelope: Envelope<InitPaymentData> =
                self.post_json("/payments/init", &request).await?;
            let body = envelope.data;
            Ok(PaymentInitiation {
                payment_id: PaymentId::new(body.payment_id),
                checkout_url: body.checkout_url.or(body.mock_checkout_url),
            })
        })
    }

    fn payment_status(
        &self,
        payment_id: PaymentId,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderPaymentStatus, ApiError>> + Send + '_>> {
        Box::pin(async move {
            let envelope: Envelope<PaymentStatusData> = self
                .get_json(&format!("/payments/{payment_id}/status"))
                .await?;
            Ok(ProviderPaymentStatus::from_wire(
                &envelope.data.payment.status,
            ))
        })
    }
}
