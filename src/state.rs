use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    Clock, Notifier, OccurrenceRepository, ReservationRepository, TemplateRepository,
    UserRepository,
};
use crate::domain::services::booking::BookingService;
use crate::domain::services::reminders::ReminderService;
use crate::domain::services::schedule::ScheduleService;

#[derive(Clone)]
pub struct Engine {
    pub config: Config,
    pub template_repo: Arc<dyn TemplateRepository>,
    pub occurrence_repo: Arc<dyn OccurrenceRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub schedule: Arc<ScheduleService>,
    pub booking: Arc<BookingService>,
    pub reminders: Arc<ReminderService>,
}

impl Engine {
    pub fn new(
        config: Config,
        template_repo: Arc<dyn TemplateRepository>,
        occurrence_repo: Arc<dyn OccurrenceRepository>,
        user_repo: Arc<dyn UserRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let schedule = Arc::new(ScheduleService::new(
            template_repo.clone(),
            occurrence_repo.clone(),
            clock.clone(),
            config.timezone,
        ));
        let booking = Arc::new(BookingService::new(
            user_repo.clone(),
            occurrence_repo.clone(),
            reservation_repo.clone(),
            clock.clone(),
        ));
        let reminders = Arc::new(ReminderService::new(
            reservation_repo.clone(),
            occurrence_repo.clone(),
            user_repo.clone(),
            notifier.clone(),
            clock.clone(),
            config.timezone,
            config.reminder_lead_minutes,
            config.reminder_scan_interval_secs,
        ));

        Self {
            config,
            template_repo,
            occurrence_repo,
            user_repo,
            reservation_repo,
            clock,
            notifier,
            schedule,
            booking,
            reminders,
        }
    }
}
