use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::utils::time::hhmm;

/// A recurring daily reminder fired when the local clock reads `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub title: String,
    pub body: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

/// Messages accepted by the reminder scheduler. The wire shape is
/// `{"type": "SCHEDULE_NOTIFICATION", "notifications": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleMessage {
    ScheduleNotification {
        #[serde(default)]
        notifications: Vec<Reminder>,
    },
}
