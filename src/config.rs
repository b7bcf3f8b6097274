use std::env;

use chrono_tz::Tz;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bot_token: String,
    pub timezone: Tz,
    pub horizon_days: u32,
    pub reminder_lead_minutes: i64,
    pub generation_interval_secs: u64,
    pub reminder_scan_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            timezone: env::var("TIMEZONE")
                .unwrap_or_else(|_| "UTC".to_string())
                .parse()
                .expect("TIMEZONE must be a valid IANA timezone name"),
            horizon_days: env::var("HORIZON_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .expect("HORIZON_DAYS must be a number"),
            reminder_lead_minutes: env::var("REMINDER_LEAD_MINUTES")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("REMINDER_LEAD_MINUTES must be a number"),
            generation_interval_secs: env::var("GENERATION_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("GENERATION_INTERVAL_SECS must be a number"),
            reminder_scan_interval_secs: env::var("REMINDER_SCAN_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("REMINDER_SCAN_INTERVAL_SECS must be a number"),
        }
    }
}
