use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock source for `created_at`, fixed to one timezone.
#[derive(Debug, Clone)]
pub struct LocalClock {
    tz: Tz,
    format: String,
}

impl LocalClock {
    pub fn new(tz: Tz, format: impl Into<String>) -> Self {
        Self {
            tz,
            format: format.into(),
        }
    }

    pub fn now(&self) -> String {
        self.format_instant(Utc::now())
    }

    pub fn format_instant(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.tz).format(&self.format).to_string()
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Kolkata, DEFAULT_TIMESTAMP_FORMAT)
    }
}
