use crate::domain::models::template::TemplateSeed;

/// Weekly schedule seeded at startup. Slots already present in the store
/// are skipped, so editing this list only ever adds new templates.
pub const DEFAULT_SCHEDULE: &[TemplateSeed] = &[
    TemplateSeed { title: "Jumping fitness", weekday: 0, time: "10:00", capacity: Some(15) },
    TemplateSeed { title: "Jumping fitness", weekday: 0, time: "19:30", capacity: Some(15) },
    TemplateSeed { title: "Jumping fitness", weekday: 2, time: "10:00", capacity: Some(15) },
    TemplateSeed { title: "Jumping fitness", weekday: 4, time: "10:00", capacity: Some(15) },
    TemplateSeed { title: "Jumping fitness", weekday: 4, time: "19:30", capacity: Some(15) },
    TemplateSeed { title: "Fat burning", weekday: 2, time: "19:30", capacity: None },
    TemplateSeed { title: "Fat burning", weekday: 5, time: "13:00", capacity: None },
];
