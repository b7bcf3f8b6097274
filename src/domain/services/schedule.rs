use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::domain::models::occurrence::Occurrence;
use crate::domain::models::template::{Template, TemplateSeed};
use crate::domain::ports::{Clock, OccurrenceRepository, TemplateRepository};
use crate::error::EngineError;

pub struct ScheduleService {
    templates: Arc<dyn TemplateRepository>,
    occurrences: Arc<dyn OccurrenceRepository>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl ScheduleService {
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        occurrences: Arc<dyn OccurrenceRepository>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        Self { templates, occurrences, clock, timezone }
    }

    pub async fn create_template(
        &self,
        title: String,
        weekday: i32,
        time_of_day: NaiveTime,
        capacity: Option<i32>,
    ) -> Result<Template, EngineError> {
        if title.trim().is_empty() {
            return Err(EngineError::Validation("title must not be empty".to_string()));
        }
        if !(0..=6).contains(&weekday) {
            return Err(EngineError::Validation(format!(
                "weekday must be 0 (Monday) to 6 (Sunday), got {weekday}"
            )));
        }
        if let Some(cap) = capacity
            && cap <= 0
        {
            return Err(EngineError::Validation(format!("capacity must be positive, got {cap}")));
        }

        let template = Template::new(title, weekday, time_of_day, capacity, self.clock.now());
        self.templates.insert(&template).await
    }

    /// Inserts any seed slots not already present. Returns how many were added,
    /// so a second start against the same store reports 0.
    pub async fn seed_templates(&self, seeds: &[TemplateSeed]) -> Result<u64, EngineError> {
        let mut inserted = 0;
        for seed in seeds {
            let time_of_day = NaiveTime::parse_from_str(seed.time, "%H:%M").map_err(|_| {
                EngineError::Validation(format!("seed time {:?} is not HH:MM", seed.time))
            })?;

            if self
                .templates
                .find_by_slot(seed.title, seed.weekday, time_of_day)
                .await?
                .is_none()
            {
                self.create_template(seed.title.to_string(), seed.weekday, time_of_day, seed.capacity)
                    .await?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>, EngineError> {
        self.templates.list().await
    }

    /// Deactivated templates stop producing occurrences; already generated
    /// occurrences are untouched.
    pub async fn set_template_active(&self, id: &str, active: bool) -> Result<Template, EngineError> {
        self.templates
            .set_active(id, active)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("template {id}")))
    }

    /// Materializes occurrences for every active template over the next
    /// `horizon_days` days, starting today in the engine timezone. Slots that
    /// already exist are left alone, so overlapping runs are harmless.
    pub async fn generate(&self, horizon_days: u32) -> Result<u64, EngineError> {
        let now = self.clock.now();
        let today = now.with_timezone(&self.timezone).date_naive();
        let templates = self.templates.list_active().await?;

        let mut inserted = 0u64;
        for day_offset in 0..horizon_days {
            let date = today + Duration::days(day_offset as i64);
            let weekday = date.weekday().num_days_from_monday() as i32;

            for template in templates.iter().filter(|t| t.weekday == weekday) {
                let Some(start_time) = occurrence_start(date, template.time_of_day, self.timezone)
                else {
                    warn!(
                        template_id = %template.id,
                        %date,
                        "Skipping slot: local time does not exist on this date (DST gap)"
                    );
                    continue;
                };

                let occurrence = Occurrence::from_template(template, start_time, now);
                if self.occurrences.insert_if_absent(&occurrence).await? {
                    inserted += 1;
                }
            }
        }

        debug!(inserted, horizon_days, "Generation pass finished");
        Ok(inserted)
    }

    pub async fn create_adhoc_occurrence(
        &self,
        title: String,
        start_time: DateTime<Utc>,
        capacity: Option<i32>,
    ) -> Result<Occurrence, EngineError> {
        if title.trim().is_empty() {
            return Err(EngineError::Validation("title must not be empty".to_string()));
        }
        if let Some(cap) = capacity
            && cap <= 0
        {
            return Err(EngineError::Validation(format!("capacity must be positive, got {cap}")));
        }
        let now = self.clock.now();
        if start_time <= now {
            return Err(EngineError::Validation("start_time must be in the future".to_string()));
        }

        self.occurrences.insert(&Occurrence::adhoc(title, start_time, capacity, now)).await
    }

    /// Adjusts a single occurrence's capacity without touching its template.
    /// Lowering below the current confirmed count is allowed; existing seats
    /// are never revoked, the occurrence just stops accepting new ones.
    pub async fn set_occurrence_capacity(
        &self,
        id: &str,
        capacity: Option<i32>,
    ) -> Result<Occurrence, EngineError> {
        if let Some(cap) = capacity
            && cap <= 0
        {
            return Err(EngineError::Validation(format!("capacity must be positive, got {cap}")));
        }
        self.occurrences
            .set_capacity(id, capacity)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("occurrence {id}")))
    }
}

/// Resolves a wall-clock slot on a given date to an absolute instant.
/// Returns None when the local time does not exist (spring-forward gap);
/// an ambiguous time (fall-back) resolves to the earlier instant.
pub fn occurrence_start(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
