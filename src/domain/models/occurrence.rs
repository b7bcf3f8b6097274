use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A concrete bookable event at an absolute instant. Generated occurrences
/// keep a reference to their template; ad-hoc ones have none.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Occurrence {
    pub id: String,
    pub template_id: Option<String>,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Occurrence {
    pub fn from_template(
        template: &super::template::Template,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            template_id: Some(template.id.clone()),
            title: template.title.clone(),
            start_time,
            capacity: template.capacity,
            created_at: now,
        }
    }

    pub fn adhoc(
        title: String,
        start_time: DateTime<Utc>,
        capacity: Option<i32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            template_id: None,
            title,
            start_time,
            capacity,
            created_at: now,
        }
    }
}
