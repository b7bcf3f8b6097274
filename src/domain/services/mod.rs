pub mod booking;
pub mod defaults;
pub mod reminders;
pub mod schedule;
