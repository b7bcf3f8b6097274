use crate::domain::models::{
    occurrence::Occurrence, reservation::Reservation, template::Template, user::User,
};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};

/// Result of an atomic reserve attempt. The store decides the outcome
/// under its own locking so concurrent callers cannot both win the last
/// seat.
#[derive(Debug)]
pub enum ReserveOutcome {
    Created(Reservation),
    DuplicateBooking,
    CapacityExhausted,
    OccurrenceMissing,
}

#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(Reservation),
    AlreadyCancelled,
    NotFound,
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn insert(&self, template: &Template) -> Result<Template, EngineError>;
    async fn find_by_slot(
        &self,
        title: &str,
        weekday: i32,
        time_of_day: NaiveTime,
    ) -> Result<Option<Template>, EngineError>;
    async fn list(&self) -> Result<Vec<Template>, EngineError>;
    async fn list_active(&self) -> Result<Vec<Template>, EngineError>;
    async fn set_active(&self, id: &str, active: bool) -> Result<Option<Template>, EngineError>;
}

#[async_trait]
pub trait OccurrenceRepository: Send + Sync {
    /// Inserts unless an occurrence with the same (template_id, start_time)
    /// already exists. Returns whether a row was written.
    async fn insert_if_absent(&self, occurrence: &Occurrence) -> Result<bool, EngineError>;
    async fn insert(&self, occurrence: &Occurrence) -> Result<Occurrence, EngineError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Occurrence>, EngineError>;
    async fn list_upcoming(
        &self,
        after: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Occurrence>, EngineError>;
    async fn set_capacity(
        &self,
        id: &str,
        capacity: Option<i32>,
    ) -> Result<Option<Occurrence>, EngineError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert-or-refresh keyed on `external_id`; a changed display name
    /// overwrites the stored one. Always returns the persisted row.
    async fn upsert(&self, user: &User) -> Result<User, EngineError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, EngineError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn reserve(&self, reservation: &Reservation) -> Result<ReserveOutcome, EngineError>;
    async fn cancel(
        &self,
        id: &str,
        user_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<CancelOutcome, EngineError>;
    async fn list_confirmed_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, EngineError>;
    async fn list_confirmed_for_occurrence(
        &self,
        occurrence_id: &str,
    ) -> Result<Vec<Reservation>, EngineError>;
    /// Atomically stamps `reminded_at` on confirmed, unreminded reservations
    /// whose occurrence starts within `(now, until]` and returns the claimed
    /// rows. Two concurrent scanners never claim the same row.
    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Reservation>, EngineError>;
    /// Clears a claim so a later scan retries the reservation.
    async fn release_reminder_claim(&self, id: &str) -> Result<(), EngineError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient_external_id: &str, text: &str) -> Result<(), EngineError>;
}
