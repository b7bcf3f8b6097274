use std::sync::Arc;

use tracing::info;

use crate::domain::models::occurrence::Occurrence;
use crate::domain::models::reservation::Reservation;
use crate::domain::models::user::{ChatIdentity, User};
use crate::domain::ports::{
    CancelOutcome, Clock, OccurrenceRepository, ReservationRepository, ReserveOutcome,
    UserRepository,
};
use crate::error::EngineError;

pub struct BookingService {
    users: Arc<dyn UserRepository>,
    occurrences: Arc<dyn OccurrenceRepository>,
    reservations: Arc<dyn ReservationRepository>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        occurrences: Arc<dyn OccurrenceRepository>,
        reservations: Arc<dyn ReservationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { users, occurrences, reservations, clock }
    }

    /// Books a seat for the caller. The capacity and duplicate checks run
    /// inside the store, so concurrent calls for the last seat settle there.
    pub async fn reserve(
        &self,
        identity: &ChatIdentity,
        occurrence_id: &str,
    ) -> Result<Reservation, EngineError> {
        let now = self.clock.now();
        let user = self.users.upsert(&User::new(identity, now)).await?;

        let occurrence = self
            .occurrences
            .find_by_id(occurrence_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("occurrence {occurrence_id}")))?;

        if occurrence.start_time <= now {
            return Err(EngineError::AlreadyStarted);
        }

        let candidate = Reservation::new(user.id, occurrence.id, now);
        match self.reservations.reserve(&candidate).await? {
            ReserveOutcome::Created(reservation) => {
                info!(
                    reservation_id = %reservation.id,
                    occurrence_id = %reservation.occurrence_id,
                    "Reservation confirmed"
                );
                Ok(reservation)
            }
            ReserveOutcome::DuplicateBooking => Err(EngineError::AlreadyBooked),
            ReserveOutcome::CapacityExhausted => Err(EngineError::Full),
            // The occurrence vanished between the lookup and the insert.
            ReserveOutcome::OccurrenceMissing => {
                Err(EngineError::NotFound(format!("occurrence {occurrence_id}")))
            }
        }
    }

    /// Cancels the caller's own reservation. The row is kept with status
    /// CANCELLED; the freed seat becomes bookable again immediately.
    pub async fn cancel(
        &self,
        identity: &ChatIdentity,
        reservation_id: &str,
    ) -> Result<Reservation, EngineError> {
        let now = self.clock.now();
        let user = self.users.upsert(&User::new(identity, now)).await?;

        match self.reservations.cancel(reservation_id, &user.id, now).await? {
            CancelOutcome::Cancelled(reservation) => {
                info!(reservation_id = %reservation.id, "Reservation cancelled");
                Ok(reservation)
            }
            CancelOutcome::AlreadyCancelled => Err(EngineError::AlreadyCancelled),
            CancelOutcome::NotFound => {
                Err(EngineError::NotFound(format!("reservation {reservation_id}")))
            }
        }
    }

    pub async fn list_upcoming(&self, limit: i64) -> Result<Vec<Occurrence>, EngineError> {
        self.occurrences.list_upcoming(self.clock.now(), limit).await
    }

    /// The caller's confirmed reservations joined with their occurrences,
    /// soonest start first.
    pub async fn list_user_reservations(
        &self,
        identity: &ChatIdentity,
    ) -> Result<Vec<(Reservation, Occurrence)>, EngineError> {
        let now = self.clock.now();
        let user = self.users.upsert(&User::new(identity, now)).await?;

        let reservations = self.reservations.list_confirmed_for_user(&user.id).await?;
        let mut out = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let occurrence = self
                .occurrences
                .find_by_id(&reservation.occurrence_id)
                .await?
                .ok_or_else(|| {
                    EngineError::Invariant(format!(
                        "reservation {} references missing occurrence {}",
                        reservation.id, reservation.occurrence_id
                    ))
                })?;
            out.push((reservation, occurrence));
        }
        Ok(out)
    }

    /// Attendee list for one occurrence, in booking order.
    pub async fn list_reservations_for_occurrence(
        &self,
        occurrence_id: &str,
    ) -> Result<Vec<(Reservation, User)>, EngineError> {
        if self.occurrences.find_by_id(occurrence_id).await?.is_none() {
            return Err(EngineError::NotFound(format!("occurrence {occurrence_id}")));
        }

        let reservations = self.reservations.list_confirmed_for_occurrence(occurrence_id).await?;
        let mut out = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let user = self.users.find_by_id(&reservation.user_id).await?.ok_or_else(|| {
                EngineError::Invariant(format!(
                    "reservation {} references missing user {}",
                    reservation.id, reservation.user_id
                ))
            })?;
            out.push((reservation, user));
        }
        Ok(out)
    }
}
