use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A weekly recurring slot. Weekday is 0 = Monday .. 6 = Sunday and
/// `time_of_day` is wall-clock time in the engine's configured timezone.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub weekday: i32,
    pub time_of_day: NaiveTime,
    pub capacity: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Template {
    pub fn new(
        title: String,
        weekday: i32,
        time_of_day: NaiveTime,
        capacity: Option<i32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            weekday,
            time_of_day,
            capacity,
            active: true,
            created_at: now,
        }
    }
}

/// Declarative seed entry for a weekly schedule baked into the binary.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSeed {
    pub title: &'static str,
    pub weekday: i32,
    pub time: &'static str,
    pub capacity: Option<i32>,
}
