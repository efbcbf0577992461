use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Flag file at `<installation root>/.maintenance`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct FlagData {
    pub enabled_at: DateTime<Utc>,
    /// `None` keeps maintenance mode on until it is disabled by hand
    pub expires_at: Option<DateTime<Utc>>,
}

impl FlagData {
    pub fn new(now: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            enabled_at: now,
            expires_at,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }

    pub fn expires_in(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at.map(|expires_at| expires_at - now)
    }
}
