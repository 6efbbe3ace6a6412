//! The in-progress reservation draft and its persisted snapshot.

use crate::error::ValidationError;
use crate::types::{AppointmentId, Money, SalonSummary, ServiceId, ServiceItem};
use salonflow_core::{DateTime, Deserialize, Serialize, Utc};

/// First wizard step: service selection
pub const FIRST_STEP: u8 = 1;

/// Second wizard step: date and time selection
pub const DATE_TIME_STEP: u8 = 2;

/// Third wizard step: confirmation of client details
pub const CONFIRMATION_STEP: u8 = 3;

/// Upper bound of the step cursor (a reserved fourth state)
pub const MAX_STEP: u8 = 4;

/// The in-progress reservation
///
/// Created empty on first entry to the booking flow or rehydrated wholesale
/// from a persisted snapshot; mutated exclusively through the booking action
/// set; destroyed on successful payment completion or explicit reset.
///
/// `total_price` and `total_duration_minutes` are derived: they always equal
/// the sums over `services` and are recomputed on every selection change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// Selected salon (read-only copy)
    pub salon: Option<SalonSummary>,
    /// Selected services, unique by id, insertion order preserved
    pub services: Vec<ServiceItem>,
    /// Appointment date as an ISO calendar date string
    pub date: Option<String>,
    /// Appointment start time as `"HH:MM"`
    pub time: Option<String>,
    /// Client first name
    pub client_first_name: Option<String>,
    /// Client last name
    pub client_last_name: Option<String>,
    /// Client contact phone
    pub client_phone: Option<String>,
    /// Client address (optional)
    pub client_address: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Derived sum of service prices
    pub total_price: Money,
    /// Derived sum of service durations
    pub total_duration_minutes: u32,
    /// Backend appointment id, set exactly once on creation
    pub booking_id: Option<AppointmentId>,
    /// Wizard cursor in `[FIRST_STEP, MAX_STEP]`
    pub step: u8,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            salon: None,
            services: Vec::new(),
            date: None,
            time: None,
            client_first_name: None,
            client_last_name: None,
            client_phone: None,
            client_address: None,
            notes: None,
            total_price: Money::ZERO,
            total_duration_minutes: 0,
            booking_id: None,
            step: FIRST_STEP,
        }
    }
}

impl BookingDraft {
    /// Append a service, idempotently by id
    ///
    /// Adding a service whose id is already selected is a no-op. Totals are
    /// recomputed from the full list after the change.
    pub fn add_service(&mut self, service: ServiceItem) {
        if self.services.iter().any(|s| s.id == service.id) {
            return;
        }
        self.services.push(service);
        self.recompute_totals();
    }

    /// Remove the service with the given id
    ///
    /// Removing a non-present id is a no-op.
    pub fn remove_service(&mut self, id: &ServiceId) {
        let before = self.services.len();
        self.services.retain(|s| &s.id != id);
        if self.services.len() != before {
            self.recompute_totals();
        }
    }

    fn recompute_totals(&mut self) {
        self.total_price = self.services.iter().map(|s| s.price).sum();
        self.total_duration_minutes = self.services.iter().map(|s| s.duration_minutes).sum();
    }

    /// Whether the draft has moved away from its initial empty values
    ///
    /// Only drafts with progress are worth snapshotting.
    #[must_use]
    pub fn has_progress(&self) -> bool {
        self.salon.is_some() || !self.services.is_empty()
    }

    /// Move the wizard cursor forward, clamped to [`MAX_STEP`]
    pub fn advance_step(&mut self) {
        self.step = (self.step + 1).min(MAX_STEP);
    }

    /// Move the wizard cursor backward, clamped to [`FIRST_STEP`]
    pub fn retreat_step(&mut self) {
        self.step = self.step.saturating_sub(1).max(FIRST_STEP);
    }

    /// Set the wizard cursor, clamped to the valid range
    pub fn set_step(&mut self, step: u8) {
        self.step = step.clamp(FIRST_STEP, MAX_STEP);
    }

    /// Completeness guard for advancing past the current step
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement of the current step: a non-empty
    /// selection to leave the services step, a date and time to leave the
    /// scheduling step. The confirmation step has no guard of its own;
    /// contact fields are checked at submission.
    pub fn guard_advance(&self) -> Result<(), ValidationError> {
        match self.step {
            FIRST_STEP => {
                if self.services.is_empty() {
                    return Err(ValidationError::NoServices);
                }
            },
            DATE_TIME_STEP => {
                if self.date.as_deref().is_none_or(str::is_empty) {
                    return Err(ValidationError::MissingDate);
                }
                if self.time.as_deref().is_none_or(str::is_empty) {
                    return Err(ValidationError::MissingTime);
                }
            },
            _ => {},
        }
        Ok(())
    }

    /// Notes to submit with the appointment
    ///
    /// The backend appointment model binds a single primary service id, so
    /// when more than one service is selected the extra ones are listed in a
    /// generated line appended to the free-text notes. Without that line the
    /// extra selections would be lost.
    #[must_use]
    pub fn combined_notes(&self) -> Option<String> {
        let base = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned);

        if self.services.len() <= 1 {
            return base;
        }

        let listed = self.services[1..]
            .iter()
            .map(|s| format!("{} ({})", s.name, s.price))
            .collect::<Vec<_>>()
            .join(", ");
        let line = format!("Additional services: {listed}");

        Some(match base {
            Some(notes) => format!("{notes}\n{line}"),
            None => line,
        })
    }
}

/// Persisted envelope around a draft
///
/// One snapshot is written wholesale on every mutation that leaves the draft
/// with progress, and removed on reset or payment completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    /// The persisted draft
    pub draft: BookingDraft,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
}

impl DraftSnapshot {
    /// Creates a new snapshot
    #[must_use]
    pub const fn new(draft: BookingDraft, saved_at: DateTime<Utc>) -> Self {
        Self { draft, saved_at }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    fn braids() -> ServiceItem {
        ServiceItem::new("svc-1", "Braids", Money::from_francs(5_000), 90)
    }

    fn manicure() -> ServiceItem {
        ServiceItem::new("svc-2", "Manicure", Money::from_francs(3_000), 45)
    }

    #[test]
    fn add_service_recomputes_totals() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.add_service(manicure());

        assert_eq!(draft.total_price, Money::from_francs(8_000));
        assert_eq!(draft.total_duration_minutes, 135);
    }

    #[test]
    fn add_service_is_idempotent_by_id() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.add_service(braids());

        assert_eq!(draft.services.len(), 1);
        assert_eq!(draft.total_price, Money::from_francs(5_000));
    }

    #[test]
    fn remove_service_recomputes_totals() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.add_service(manicure());
        draft.remove_service(&ServiceId::new("svc-1"));

        assert_eq!(draft.services.len(), 1);
        assert_eq!(draft.total_price, Money::from_francs(3_000));
        assert_eq!(draft.total_duration_minutes, 45);
    }

    #[test]
    fn remove_absent_service_is_noop() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.remove_service(&ServiceId::new("svc-404"));

        assert_eq!(draft.services.len(), 1);
        assert_eq!(draft.total_price, Money::from_francs(5_000));
    }

    #[test]
    fn step_never_leaves_valid_range() {
        let mut draft = BookingDraft::default();
        draft.retreat_step();
        assert_eq!(draft.step, FIRST_STEP);

        for _ in 0..10 {
            draft.advance_step();
        }
        assert_eq!(draft.step, MAX_STEP);

        draft.set_step(0);
        assert_eq!(draft.step, FIRST_STEP);
        draft.set_step(42);
        assert_eq!(draft.step, MAX_STEP);
    }

    #[test]
    fn guard_blocks_empty_selection() {
        let draft = BookingDraft::default();
        assert_eq!(draft.guard_advance(), Err(ValidationError::NoServices));
    }

    #[test]
    fn guard_requires_date_and_time() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.set_step(DATE_TIME_STEP);
        assert_eq!(draft.guard_advance(), Err(ValidationError::MissingDate));

        draft.date = Some("2026-09-01".to_string());
        assert_eq!(draft.guard_advance(), Err(ValidationError::MissingTime));

        draft.time = Some("10:30".to_string());
        assert_eq!(draft.guard_advance(), Ok(()));
    }

    #[test]
    fn combined_notes_single_service_passes_through() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.notes = Some("please be on time".to_string());

        assert_eq!(
            draft.combined_notes(),
            Some("please be on time".to_string())
        );
    }

    #[test]
    fn combined_notes_lists_extra_services() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.add_service(manicure());
        draft.notes = Some("please be on time".to_string());

        assert_eq!(
            draft.combined_notes(),
            Some("please be on time\nAdditional services: Manicure (3000 F)".to_string())
        );
    }

    #[test]
    fn combined_notes_without_free_text() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.add_service(manicure());

        assert_eq!(
            draft.combined_notes(),
            Some("Additional services: Manicure (3000 F)".to_string())
        );
    }

    #[test]
    fn empty_notes_submit_as_none() {
        let mut draft = BookingDraft::default();
        draft.add_service(braids());
        draft.notes = Some("   ".to_string());

        assert_eq!(draft.combined_notes(), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(u8, i64, u32),
            Remove(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..20u8, 0..50_000i64, 0..240u32).prop_map(|(id, price, mins)| Op::Add(id, price, mins)),
                (0..20u8).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn totals_always_match_selection(ops in proptest::collection::vec(op_strategy(), 0..64)) {
                let mut draft = BookingDraft::default();
                for op in ops {
                    match op {
                        Op::Add(id, price, mins) => draft.add_service(ServiceItem::new(
                            format!("svc-{id}"),
                            format!("Service {id}"),
                            Money::from_francs(price),
                            mins,
                        )),
                        Op::Remove(id) => draft.remove_service(&ServiceId::new(format!("svc-{id}"))),
                    }
                }

                let expected_price: Money = draft.services.iter().map(|s| s.price).sum();
                let expected_minutes: u32 = draft.services.iter().map(|s| s.duration_minutes).sum();
                prop_assert_eq!(draft.total_price, expected_price);
                prop_assert_eq!(draft.total_duration_minutes, expected_minutes);

                // Unique by id regardless of the operation sequence
                let mut ids: Vec<_> = draft.services.iter().map(|s| s.id.as_str()).collect();
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), draft.services.len());
            }
        }
    }
}
